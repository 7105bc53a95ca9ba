//! Audio upload validation and object-key naming

use crate::error::{FieldError, LibraryError, Result};
use bytes::Bytes;
use std::path::Path;
use url::Url;
use uuid::Uuid;

pub const ALLOWED_AUDIO_TYPES: [&str; 7] = [
    "audio/mpeg",
    "audio/wav",
    "audio/mp4",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
    "audio/x-ms-wma",
];

/// 50 MiB
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Prefix under which every song file is stored
pub const SONG_KEY_PREFIX: &str = "songs/";

/// An audio file received from a client, held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    /// Name of the file on the client side
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl AudioUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check content type, size and name before anything is stored
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_AUDIO_TYPES.contains(&self.content_type.as_str()) {
            return Err(LibraryError::BadRequest {
                message: format!(
                    "Invalid file type. Allowed types: {}",
                    ALLOWED_AUDIO_TYPES.join(", ")
                ),
                errors: vec![FieldError::new("file", "Unsupported audio type")],
            });
        }

        if self.data.is_empty() {
            return Err(LibraryError::bad_request("Audio file is empty"));
        }

        if self.size() > MAX_UPLOAD_BYTES {
            return Err(LibraryError::bad_request("File size too large"));
        }

        if self.file_name.trim().is_empty() {
            return Err(LibraryError::validation(vec![FieldError::new(
                "fileName",
                "File name is required",
            )]));
        }

        Ok(())
    }

    /// `songs/{unix_ms}-{12 hex chars}{.ext}`, keeping the client's extension
    /// when it is plain alphanumeric so the key stays URL-safe
    pub fn object_key(&self, now_millis: i64) -> String {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let random = Uuid::new_v4().simple().to_string();

        format!("{}{}-{}{}", SONG_KEY_PREFIX, now_millis, &random[..12], extension)
    }
}

/// Object key for a stored file URL: the URL path without its leading `/`.
///
/// Returns `None` when the URL cannot be parsed or has an empty path.
pub fn key_from_url(file_url: &str) -> Option<String> {
    let url = Url::parse(file_url).ok()?;
    let path = url.path();
    let key = path.strip_prefix('/').unwrap_or(path);

    (!key.is_empty()).then(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> AudioUpload {
        AudioUpload::new("Track 01.MP3", content_type, vec![0u8; size])
    }

    #[test]
    fn test_allowed_types_pass() {
        for content_type in ALLOWED_AUDIO_TYPES {
            assert!(upload(content_type, 16).validate().is_ok(), "{content_type}");
        }
    }

    #[test]
    fn test_rejects_bad_type_and_size() {
        let err = upload("video/mp4", 16).validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().starts_with("Invalid file type"));

        let err = upload("audio/mpeg", MAX_UPLOAD_BYTES + 1).validate().unwrap_err();
        assert_eq!(err.to_string(), "File size too large");

        assert!(upload("audio/mpeg", MAX_UPLOAD_BYTES).validate().is_ok());
        assert!(upload("audio/mpeg", 0).validate().is_err());
    }

    #[test]
    fn test_object_key_shape() {
        let key = upload("audio/mpeg", 1).object_key(1_700_000_000_000);
        assert!(key.starts_with("songs/1700000000000-"));
        assert!(key.ends_with(".MP3"));

        let random = &key["songs/1700000000000-".len()..key.len() - ".MP3".len()];
        assert_eq!(random.len(), 12);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));

        let bare = AudioUpload::new("noext", "audio/mpeg", vec![1u8]).object_key(5);
        assert_eq!(bare.len(), "songs/5-".len() + 12);

        let odd = AudioUpload::new("take.m p3", "audio/mpeg", vec![1u8]).object_key(5);
        assert_eq!(odd.len(), "songs/5-".len() + 12);
    }

    #[test]
    fn test_key_from_url() {
        assert_eq!(
            key_from_url("https://bucket.s3.amazonaws.com/songs/1-abc.mp3").as_deref(),
            Some("songs/1-abc.mp3")
        );
        assert_eq!(
            key_from_url("http://localhost:8080/songs/a%20b.mp3?x=1").as_deref(),
            Some("songs/a%20b.mp3")
        );
        assert_eq!(key_from_url("/songs/x.mp3"), None);
        assert_eq!(key_from_url("https://bucket.example.com"), None);
        assert_eq!(key_from_url("https://bucket.example.com/"), None);
    }
}
