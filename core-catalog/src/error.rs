use bridge_traits::error::BridgeError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Coarse classification every error collapses to at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP status the transport layer should use for this kind
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

/// A single failed field in a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Object store error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{message}")]
    BadRequest {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;

impl LibraryError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        LibraryError::BadRequest {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        LibraryError::BadRequest {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    pub fn not_found(entity_type: &str, id: &str) -> Self {
        LibraryError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryError::BadRequest { .. } => ErrorKind::BadRequest,
            LibraryError::NotFound { .. } => ErrorKind::NotFound,
            LibraryError::Conflict(_) => ErrorKind::Conflict,
            LibraryError::Database(e) if is_unique_violation(e) => ErrorKind::Conflict,
            LibraryError::Database(_)
            | LibraryError::Bridge(_)
            | LibraryError::Timeout(_)
            | LibraryError::Migration(_)
            | LibraryError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Per-field details for validation failures, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            LibraryError::BadRequest { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Re-raise as one of the four boundary kinds.
    ///
    /// Already classified errors pass through unchanged. Unique-constraint
    /// violations become `Conflict`; anything else becomes `Internal` carrying
    /// `context` as its message, with the underlying cause logged.
    pub fn at_boundary(self, context: &str) -> LibraryError {
        match self {
            LibraryError::BadRequest { .. }
            | LibraryError::NotFound { .. }
            | LibraryError::Conflict(_) => self,
            LibraryError::Database(ref e) if is_unique_violation(e) => {
                let field = violated_column(e).unwrap_or_else(|| "resource".to_string());
                LibraryError::Conflict(format!("{} already exists", field))
            }
            LibraryError::Internal(ref message) if message == context => self,
            other => {
                warn!(error = %other, context, "Storage operation failed");
                LibraryError::Internal(context.to_string())
            }
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}

/// Column named in a SQLite "UNIQUE constraint failed: table.column" message
fn violated_column(error: &sqlx::Error) -> Option<String> {
    let sqlx::Error::Database(db_error) = error else {
        return None;
    };
    let message = db_error.message();
    let (_, columns) = message.split_once("failed:")?;
    let first = columns.split(',').next()?.trim();
    let column = first.rsplit('.').next()?.trim();
    (!column.is_empty()).then(|| column.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_status_mapping() {
        assert_eq!(LibraryError::bad_request("nope").status_code(), 400);
        assert_eq!(LibraryError::not_found("Song", "1").status_code(), 404);
        assert_eq!(LibraryError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(
            LibraryError::Timeout(Duration::from_secs(1)).status_code(),
            500
        );
        assert_eq!(
            LibraryError::Bridge(BridgeError::OperationFailed("x".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_at_boundary_preserves_classified_errors() {
        let err = LibraryError::not_found("Song", "abc").at_boundary("Failed to fetch song");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = LibraryError::bad_request("No valid update data provided")
            .at_boundary("Failed to update song");
        assert_eq!(err.to_string(), "No valid update data provided");
    }

    #[test]
    fn test_at_boundary_hides_storage_details() {
        let err = LibraryError::Database(sqlx::Error::PoolTimedOut).at_boundary("Failed to fetch songs");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "Failed to fetch songs");

        let err = LibraryError::Timeout(Duration::from_millis(5)).at_boundary("Failed to fetch songs");
        assert_eq!(err.to_string(), "Failed to fetch songs");
    }

    #[test]
    fn test_validation_carries_field_errors() {
        let err = LibraryError::validation(vec![
            FieldError::new("title", "Song title is required"),
            FieldError::new("artist", "Artist name is required"),
        ]);
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(err.field_errors()[0].field, "title");
        assert!(LibraryError::Internal("x".into()).field_errors().is_empty());
    }
}
