//! # Song Catalog
//!
//! Owns the song database and the read/write paths over it.
//!
//! ## Overview
//!
//! - [`filter`] turns raw query parameters into storage predicates
//! - [`pagination`] normalises page/limit and builds result pages
//! - [`query`] runs paginated listings (fetch and count in parallel)
//! - [`stats`] aggregates catalog statistics
//! - [`service`] handles creation, updates, uploads and deletion
//! - [`repositories`] is the storage seam, with a SQLite implementation

pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repositories;
pub mod service;
pub mod stats;
pub mod uploads;

pub use error::{ErrorKind, FieldError, LibraryError, Result};
pub use filter::{SongFilter, SongQueryParams, StatsFilter, StatsQueryParams};
pub use models::{FileAttachment, Genre, NewSong, Song, SongUpdate};
pub use pagination::{Page, PageInfo, PageRequest};
pub use query::{SongQueryService, SongSort, SortField, SortOrder};
pub use repositories::{SongRepository, SqliteSongRepository};
pub use service::SongService;
pub use stats::{AlbumStat, ArtistStat, SongStats, StatsService};
pub use uploads::AudioUpload;
