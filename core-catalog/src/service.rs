//! Song CRUD service.
//!
//! Owns the write paths: creation (optionally with an audio upload), partial
//! updates, hard delete with object-store cleanup, and soft delete/restore.
//! Every storage and object-store call is bounded by the configured timeout
//! and every error leaves through [`LibraryError::at_boundary`].

use crate::error::{LibraryError, Result};
use crate::models::{FileAttachment, NewSong, Song, SongUpdate};
use crate::repositories::{bounded, SongRepository};
use crate::uploads::{key_from_url, AudioUpload};
use bridge_traits::{Clock, ObjectStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CREATE_SONG_FAILED: &str = "Failed to create song";
pub const FETCH_SONG_FAILED: &str = "Failed to fetch song";
pub const UPDATE_SONG_FAILED: &str = "Failed to update song";
pub const DELETE_SONG_FAILED: &str = "Failed to delete song";
pub const UPLOAD_FILE_FAILED: &str = "Failed to upload file to object store";
pub const DELETE_FILE_FAILED: &str = "Failed to delete file from object store";
pub const NO_UPDATE_DATA: &str = "No valid update data provided";

#[derive(Clone)]
pub struct SongService {
    repository: Arc<dyn SongRepository>,
    object_store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl SongService {
    pub fn new(
        repository: Arc<dyn SongRepository>,
        object_store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            object_store,
            clock,
            timeout,
        }
    }

    /// Validate and persist a new song
    pub async fn create_song(&self, new_song: NewSong) -> Result<Song> {
        let song = new_song.into_song(self.clock.unix_timestamp_millis());
        self.insert(song).await
    }

    /// Store the audio file, then create the song pointing at it.
    ///
    /// The metadata is validated before anything is uploaded. If the row
    /// cannot be written the uploaded object is removed again.
    pub async fn create_song_with_upload(
        &self,
        new_song: NewSong,
        upload: AudioUpload,
    ) -> Result<Song> {
        upload.validate()?;

        let now = self.clock.unix_timestamp_millis();
        new_song.clone().into_song(now).validate()?;

        let key = upload.object_key(now);
        let stored = bounded(
            self.timeout,
            async {
                self.object_store
                    .put_object(&key, upload.data.clone(), &upload.content_type)
                    .await
                    .map_err(LibraryError::from)
            },
        )
        .await
        .map_err(|e| e.at_boundary(UPLOAD_FILE_FAILED))?;

        info!(key = %stored.key, size = stored.size, "Uploaded audio file");

        let song = new_song
            .with_file(FileAttachment {
                file_url: stored.url,
                file_name: upload.file_name,
                file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
            })
            .into_song(now);

        match self.insert(song).await {
            Ok(song) => Ok(song),
            Err(error) => {
                if let Err(cleanup) = self.object_store.delete_object(&stored.key).await {
                    warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(error)
            }
        }
    }

    /// Fetch a live (not soft-deleted) song
    pub async fn get_song(&self, id: &str) -> Result<Song> {
        match self.load(id, FETCH_SONG_FAILED).await? {
            Some(song) if !song.is_deleted() => Ok(song),
            _ => Err(LibraryError::not_found("Song", id)),
        }
    }

    /// Apply the non-blank fields of `update` to a live song.
    ///
    /// # Errors
    /// `BadRequest` when nothing usable remains after cleaning; no storage
    /// call is made in that case.
    pub async fn update_song(&self, id: &str, update: SongUpdate) -> Result<Song> {
        let update = update.cleaned();
        if update.is_empty() {
            return Err(LibraryError::bad_request(NO_UPDATE_DATA));
        }

        let mut song = match self.load(id, UPDATE_SONG_FAILED).await? {
            Some(song) if !song.is_deleted() => song,
            _ => return Err(LibraryError::not_found("Song", id)),
        };

        update.apply_to(&mut song, self.clock.unix_timestamp_millis());
        song.validate()?;

        bounded(self.timeout, self.repository.update(&song))
            .await
            .map_err(|e| e.at_boundary(UPDATE_SONG_FAILED))?;

        debug!(song_id = %song.id, "Updated song");
        Ok(song)
    }

    /// Hard-delete a song and its stored audio file.
    ///
    /// The object is removed first; if that fails the row is kept and the
    /// call fails with `Internal`. Returns the id of the deleted song.
    pub async fn delete_song(&self, id: &str) -> Result<String> {
        let song = self
            .load(id, DELETE_SONG_FAILED)
            .await?
            .ok_or_else(|| LibraryError::not_found("Song", id))?;

        if let Some(file_url) = &song.file_url {
            self.delete_file(file_url).await?;
        }

        let deleted = bounded(self.timeout, self.repository.delete(id))
            .await
            .map_err(|e| e.at_boundary(DELETE_SONG_FAILED))?;
        if !deleted {
            return Err(LibraryError::not_found("Song", id));
        }

        info!(song_id = %id, "Deleted song");
        Ok(song.id)
    }

    /// Mark a song as deleted without removing it
    pub async fn soft_delete_song(&self, id: &str) -> Result<Song> {
        let now = self.clock.unix_timestamp_millis();
        self.set_deleted_at(id, Some(now), now).await
    }

    /// Clear the soft-delete marker
    pub async fn restore_song(&self, id: &str) -> Result<Song> {
        let now = self.clock.unix_timestamp_millis();
        self.set_deleted_at(id, None, now).await
    }

    async fn set_deleted_at(&self, id: &str, deleted_at: Option<i64>, now: i64) -> Result<Song> {
        let mut song = self
            .load(id, UPDATE_SONG_FAILED)
            .await?
            .ok_or_else(|| LibraryError::not_found("Song", id))?;

        if song.deleted_at.is_some() == deleted_at.is_some() {
            return Ok(song);
        }

        let updated = bounded(
            self.timeout,
            self.repository.set_deleted_at(id, deleted_at, now),
        )
        .await
        .map_err(|e| e.at_boundary(UPDATE_SONG_FAILED))?;
        if !updated {
            return Err(LibraryError::not_found("Song", id));
        }

        song.deleted_at = deleted_at;
        song.updated_at = now;
        debug!(song_id = %id, deleted = deleted_at.is_some(), "Changed soft-delete marker");
        Ok(song)
    }

    async fn delete_file(&self, file_url: &str) -> Result<()> {
        let Some(key) = key_from_url(file_url) else {
            warn!(file_url, "Cannot derive object key from file URL");
            return Err(LibraryError::Internal(DELETE_FILE_FAILED.to_string()));
        };

        bounded(self.timeout, async {
            self.object_store
                .delete_object(&key)
                .await
                .map_err(LibraryError::from)
        })
        .await
        .map_err(|e| e.at_boundary(DELETE_FILE_FAILED))
    }

    async fn load(&self, id: &str, context: &str) -> Result<Option<Song>> {
        bounded(self.timeout, self.repository.find_by_id(id))
            .await
            .map_err(|e| e.at_boundary(context))
    }

    async fn insert(&self, song: Song) -> Result<Song> {
        song.validate()?;

        bounded(self.timeout, self.repository.insert(&song))
            .await
            .map_err(|e| e.at_boundary(CREATE_SONG_FAILED))?;

        info!(song_id = %song.id, title = %song.title, "Created song");
        Ok(song)
    }
}
