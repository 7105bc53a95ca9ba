//! # Storage Collaborator
//!
//! The catalog services only talk to storage through [`SongRepository`].
//! [`SqliteSongRepository`] is the sqlx-backed implementation; tests swap in
//! mocks or an in-memory pool.
//!
//! Every call made by a service goes through [`bounded`], so a stalled
//! database surfaces as [`LibraryError::Timeout`] instead of hanging the
//! caller.

pub mod song;

pub use song::{GroupRow, Grouping, SongRepository, SqliteSongRepository};

use crate::error::{LibraryError, Result};
use std::future::Future;
use std::time::Duration;

/// Await `operation`, failing with [`LibraryError::Timeout`] once `limit` elapses.
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(LibraryError::Timeout(limit)),
    }
}
