//! Operation surface for transports.
//!
//! Each method runs one catalog operation and wraps the outcome, success or
//! failure, in an [`ApiResponse`]. A transport only has to copy
//! `status_code` onto its reply and serialize the envelope.

use crate::api::{ApiResponse, HealthStatus, Paginated};
use bridge_traits::Clock;
use core_catalog::{
    AudioUpload, ErrorKind, LibraryError, NewSong, Result, Song, SongQueryParams,
    SongQueryService, SongService, SongStats, SongUpdate, StatsQueryParams, StatsService,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub const AUDIO_FILE_REQUIRED: &str = "Audio file is required";

#[derive(Clone)]
pub struct SongController {
    songs: SongService,
    queries: SongQueryService,
    stats: StatsService,
    clock: Arc<dyn Clock>,
    started_at: Instant,
}

impl SongController {
    pub fn new(
        songs: SongService,
        queries: SongQueryService,
        stats: StatsService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            songs,
            queries,
            stats,
            clock,
            started_at: Instant::now(),
        }
    }

    /// Create a song from metadata plus its audio file
    pub async fn create_song(
        &self,
        new_song: NewSong,
        upload: Option<AudioUpload>,
    ) -> ApiResponse<Song> {
        let result = match upload {
            Some(upload) => self.songs.create_song_with_upload(new_song, upload).await,
            None => Err(LibraryError::bad_request(AUDIO_FILE_REQUIRED)),
        };

        self.respond(result, "create_song", |song| {
            info!(song_id = %song.id, "Song created");
            ApiResponse::created(song, "Song created successfully")
        })
    }

    pub async fn list_songs(&self, params: &SongQueryParams) -> ApiResponse<Paginated<Song>> {
        let result = self.queries.list_songs_from_params(params).await;
        self.respond(result, "list_songs", |page| {
            ApiResponse::paginated(page, "Songs retrieved successfully")
        })
    }

    pub async fn get_song(&self, id: &str) -> ApiResponse<Song> {
        let result = self.songs.get_song(id).await;
        self.respond(result, "get_song", |song| {
            ApiResponse::success(song, "Song retrieved successfully")
        })
    }

    pub async fn update_song(&self, id: &str, update: SongUpdate) -> ApiResponse<Song> {
        let result = self.songs.update_song(id, update).await;
        self.respond(result, "update_song", |song| {
            ApiResponse::success(song, "Song updated successfully")
        })
    }

    /// Hard delete; the payload is the deleted id
    pub async fn delete_song(&self, id: &str) -> ApiResponse<String> {
        let result = self.songs.delete_song(id).await;
        self.respond(result, "delete_song", |id| {
            info!(song_id = %id, "Song deleted");
            ApiResponse::success(id, "Song deleted successfully")
        })
    }

    pub async fn soft_delete_song(&self, id: &str) -> ApiResponse<Song> {
        let result = self.songs.soft_delete_song(id).await;
        self.respond(result, "soft_delete_song", |song| {
            ApiResponse::success(song, "Song soft-deleted successfully")
        })
    }

    pub async fn restore_song(&self, id: &str) -> ApiResponse<Song> {
        let result = self.songs.restore_song(id).await;
        self.respond(result, "restore_song", |song| {
            ApiResponse::success(song, "Song restored successfully")
        })
    }

    pub async fn get_stats(&self, params: &StatsQueryParams) -> ApiResponse<SongStats> {
        let result = self.stats.get_stats_from_params(params).await;
        self.respond(result, "get_stats", |stats| {
            ApiResponse::success(stats, "Song statistics retrieved successfully")
        })
    }

    pub fn health(&self) -> ApiResponse<HealthStatus> {
        let uptime = self.started_at.elapsed().as_secs_f64();
        ApiResponse::success(HealthStatus::ok(uptime), "Service is healthy")
            .at(self.clock.now())
    }

    fn respond<T, U>(
        &self,
        result: Result<T>,
        operation: &str,
        on_success: impl FnOnce(T) -> ApiResponse<U>,
    ) -> ApiResponse<U> {
        let response = match result {
            Ok(value) => on_success(value),
            Err(err) => {
                match err.kind() {
                    ErrorKind::Internal => error!(operation, error = %err, "Operation failed"),
                    _ => warn!(
                        operation,
                        status = err.status_code(),
                        error = %err,
                        "Request rejected"
                    ),
                }
                ApiResponse::error(&err)
            }
        };
        response.at(self.clock.now())
    }
}
