//! Catalog statistics.
//!
//! A report is assembled from six independent reads over the same predicate,
//! all issued at once. Genre counts always list every genre.

use crate::error::Result;
use crate::filter::{StatsFilter, StatsQueryParams};
use crate::models::Genre;
use crate::repositories::{bounded, GroupRow, Grouping, SongRepository};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FETCH_STATS_FAILED: &str = "Failed to fetch song statistics";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistStat {
    pub artist: String,
    pub total_songs: u64,
    /// Distinct non-empty album names
    pub total_albums: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumStat {
    pub album: Option<String>,
    pub artist: String,
    pub total_songs: u64,
}

/// Aggregated catalog report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongStats {
    pub total_songs: u64,
    pub total_artists: u64,
    /// Distinct `(album, artist)` pairs
    pub total_albums: u64,
    pub songs_by_genre: BTreeMap<Genre, u64>,
    pub artist_stats: Vec<ArtistStat>,
    pub album_stats: Vec<AlbumStat>,
}

impl SongStats {
    pub fn empty() -> Self {
        Self {
            total_songs: 0,
            total_artists: 0,
            total_albums: 0,
            songs_by_genre: zero_filled_genres(),
            artist_stats: Vec::new(),
            album_stats: Vec::new(),
        }
    }
}

fn zero_filled_genres() -> BTreeMap<Genre, u64> {
    Genre::ALL.iter().map(|genre| (*genre, 0)).collect()
}

/// Stats aggregator
#[derive(Clone)]
pub struct StatsService {
    repository: Arc<dyn SongRepository>,
    timeout: Duration,
}

impl StatsService {
    pub fn new(repository: Arc<dyn SongRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    pub async fn get_stats_from_params(&self, params: &StatsQueryParams) -> Result<SongStats> {
        self.get_stats(&StatsFilter::from_params(params)).await
    }

    /// Compute the statistics report for songs matching `filter`.
    ///
    /// # Errors
    /// Any storage failure or timeout is reported as
    /// `Internal("Failed to fetch song statistics")`.
    pub async fn get_stats(&self, filter: &StatsFilter) -> Result<SongStats> {
        let predicate = filter.to_predicate();
        let repo = &self.repository;
        let limit = self.timeout;
        debug!(conditions = predicate.conditions().len(), "Computing song statistics");

        let (total_songs, total_artists, total_albums, genres, artists, albums) = futures::try_join!(
            bounded(limit, repo.count(&predicate)),
            bounded(limit, repo.count_distinct(&predicate, Grouping::Artist)),
            bounded(limit, repo.count_distinct(&predicate, Grouping::AlbumArtist)),
            bounded(limit, repo.aggregate(&predicate, Grouping::Genre)),
            bounded(limit, repo.aggregate(&predicate, Grouping::Artist)),
            bounded(limit, repo.aggregate(&predicate, Grouping::AlbumArtist)),
        )
        .map_err(|e| e.at_boundary(FETCH_STATS_FAILED))?;

        Ok(SongStats {
            total_songs,
            total_artists,
            total_albums,
            songs_by_genre: genre_counts(genres),
            artist_stats: artist_rollup(artists),
            album_stats: album_rollup(albums),
        })
    }
}

fn genre_counts(rows: Vec<GroupRow>) -> BTreeMap<Genre, u64> {
    let mut counts = zero_filled_genres();
    for row in rows {
        match row.key.as_deref().map(str::parse::<Genre>) {
            Some(Ok(genre)) => {
                counts.insert(genre, row.songs);
            }
            _ => warn!(genre = ?row.key, "Skipping unknown genre in statistics"),
        }
    }
    counts
}

fn artist_rollup(mut rows: Vec<GroupRow>) -> Vec<ArtistStat> {
    rows.sort_by(|a, b| b.songs.cmp(&a.songs).then_with(|| a.key.cmp(&b.key)));
    rows.into_iter()
        .map(|row| ArtistStat {
            artist: row.key.unwrap_or_default(),
            total_songs: row.songs,
            total_albums: row.albums,
        })
        .collect()
}

fn album_rollup(mut rows: Vec<GroupRow>) -> Vec<AlbumStat> {
    rows.sort_by(|a, b| {
        b.songs
            .cmp(&a.songs)
            .then_with(|| a.key.cmp(&b.key))
            .then_with(|| a.artist.cmp(&b.artist))
    });
    rows.into_iter()
        .map(|row| AlbumStat {
            album: row.key,
            artist: row.artist.unwrap_or_default(),
            total_songs: row.songs,
        })
        .collect()
}
