//! Response envelope shared by every catalog operation.
//!
//! Successful and failed calls produce the same JSON shape:
//!
//! ```json
//! { "success": true, "statusCode": 200, "data": { ... },
//!   "message": "Song retrieved successfully", "timestamp": "2024-01-01T00:00:00.000Z" }
//! ```
//!
//! Failures carry `data: null` and, for validation failures, an `errors`
//! array of `{ field, message }` objects.

use chrono::{DateTime, SecondsFormat, Utc};
use core_catalog::{ErrorKind, FieldError, LibraryError, Page, PageInfo};
use serde::{Deserialize, Serialize};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// `true` for status codes below 400
    pub success: bool,
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    /// RFC 3339 with millisecond precision
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: status_code < 400,
            status_code,
            data,
            message: message.into(),
            timestamp: format_timestamp(Utc::now()),
            errors: None,
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::new(200, Some(data), message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(201, Some(data), message)
    }

    /// Failure envelope for a catalog error.
    ///
    /// The status follows the error kind. Internal failures that were not
    /// already given a public message are reported generically.
    pub fn error(error: &LibraryError) -> Self {
        let message = match error {
            LibraryError::Internal(message) => message.clone(),
            other if other.kind() == ErrorKind::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };

        let mut response = Self::new(error.status_code(), None, message);
        let field_errors = error.field_errors();
        if !field_errors.is_empty() {
            response.errors = Some(field_errors.to_vec());
        }
        response
    }

    /// Replace the timestamp, e.g. with a value from an injected clock
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = format_timestamp(timestamp);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl<T> ApiResponse<Paginated<T>> {
    pub fn paginated(page: Page<T>, message: impl Into<String>) -> Self {
        Self::success(Paginated::from(page), message)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Listing payload: `{ items, pagination }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = page.info();
        Self {
            items: page.items,
            pagination,
        }
    }
}

/// Liveness payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: f64,
}

impl HealthStatus {
    pub fn ok(uptime_seconds: f64) -> Self {
        Self {
            status: "OK".to_string(),
            uptime_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use core_catalog::PageRequest;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let fixed = DateTime::from_timestamp_millis(1_704_067_200_000).unwrap();
        let response = ApiResponse::success(json!({"id": "1"}), "Song retrieved successfully").at(fixed);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["data"]["id"], "1");
        assert_eq!(value["message"], "Song retrieved successfully");
        assert_eq!(value["timestamp"], "2024-01-01T00:00:00.000Z");
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_created_is_201() {
        let response = ApiResponse::created(1, "Song created successfully");
        assert_eq!(response.status_code, 201);
        assert!(response.is_success());
    }

    #[test]
    fn test_error_envelope_follows_kind() {
        let response = ApiResponse::<()>::error(&LibraryError::not_found("Song", "x"));
        assert_eq!(response.status_code, 404);
        assert!(!response.success);
        assert!(response.data.is_none());

        let response = ApiResponse::<()>::error(&LibraryError::Conflict("id already exists".into()));
        assert_eq!(response.status_code, 409);
        assert_eq!(response.message, "id already exists");
    }

    #[test]
    fn test_validation_errors_are_listed() {
        let error = LibraryError::validation(vec![FieldError::new("title", "Title is required")]);
        let value = serde_json::to_value(ApiResponse::<()>::error(&error)).unwrap();

        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["message"], "Validation failed");
        assert_eq!(value["errors"][0]["field"], "title");
        assert_eq!(value["data"], serde_json::Value::Null);
    }

    #[test]
    fn test_unclassified_internal_errors_are_generic() {
        let error = LibraryError::Bridge(BridgeError::OperationFailed("disk on fire".into()));
        let response = ApiResponse::<()>::error(&error);
        assert_eq!(response.status_code, 500);
        assert_eq!(response.message, INTERNAL_ERROR_MESSAGE);

        let error = LibraryError::Internal("Failed to fetch songs".into());
        assert_eq!(ApiResponse::<()>::error(&error).message, "Failed to fetch songs");
    }

    #[test]
    fn test_paginated_payload() {
        let page = Page::new(vec!["a", "b"], 12, PageRequest::new(2, 2));
        let value = serde_json::to_value(ApiResponse::paginated(page, "ok")).unwrap();

        assert_eq!(value["data"]["items"], json!(["a", "b"]));
        assert_eq!(value["data"]["pagination"]["total"], 12);
        assert_eq!(value["data"]["pagination"]["pages"], 6);
        assert_eq!(value["data"]["pagination"]["hasNext"], true);
        assert_eq!(value["data"]["pagination"]["hasPrev"], true);
    }

    #[test]
    fn test_health_payload() {
        let value = serde_json::to_value(HealthStatus::ok(1.5)).unwrap();
        assert_eq!(value, json!({"status": "OK", "uptimeSeconds": 1.5}));
    }
}
