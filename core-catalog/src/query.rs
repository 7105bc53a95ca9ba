//! Paginated song listing.
//!
//! The page fetch and the total count are independent reads, so they are
//! issued together and joined; either one failing (or timing out) fails the
//! whole listing.

use crate::error::Result;
use crate::filter::{SongFilter, SongQueryParams};
use crate::models::Song;
use crate::pagination::{Page, PageRequest};
use crate::repositories::{bounded, SongRepository};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const FETCH_SONGS_FAILED: &str = "Failed to fetch songs";

/// Columns a listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    Artist,
    Album,
    Genre,
    Duration,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Artist => "artist",
            SortField::Album => "album",
            SortField::Genre => "genre",
            SortField::Duration => "duration",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "artist" => Ok(SortField::Artist),
            "album" => Ok(SortField::Album),
            "genre" => Ok(SortField::Genre),
            "duration" => Ok(SortField::Duration),
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            other => Err(format!("'{}' is not a sortable field", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Sort specification; ties are always broken by id so pages stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SongSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl SongSort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Lenient parse: unknown fields fall back to `createdAt`, and anything
    /// other than `asc` sorts descending.
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        let field = sort_by
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default();
        let order = match sort_order.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        Self { field, order }
    }
}

/// Query executor for song listings
#[derive(Clone)]
pub struct SongQueryService {
    repository: Arc<dyn SongRepository>,
    timeout: Duration,
}

impl SongQueryService {
    pub fn new(repository: Arc<dyn SongRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    /// Run a listing straight from raw query parameters
    pub async fn list_songs_from_params(&self, params: &SongQueryParams) -> Result<Page<Song>> {
        let filter = SongFilter::from_params(params);
        let page_request = PageRequest::from_params(params.page.as_deref(), params.limit.as_deref());
        let sort = SongSort::from_params(params.sort_by.as_deref(), params.sort_order.as_deref());
        self.list_songs(&filter, page_request, sort).await
    }

    /// Fetch one page of matching songs together with the total match count.
    ///
    /// # Errors
    /// Any storage failure or timeout is reported as `Internal("Failed to fetch songs")`.
    pub async fn list_songs(
        &self,
        filter: &SongFilter,
        page_request: PageRequest,
        sort: SongSort,
    ) -> Result<Page<Song>> {
        let predicate = filter.to_predicate();
        debug!(
            conditions = predicate.conditions().len(),
            page = page_request.page,
            limit = page_request.limit,
            sort_by = sort.field.column(),
            "Listing songs"
        );

        let fetch = bounded(
            self.timeout,
            self.repository
                .find(&predicate, sort, page_request.skip(), page_request.limit),
        );
        let count = bounded(self.timeout, self.repository.count(&predicate));

        let (items, total) = futures::try_join!(fetch, count)
            .map_err(|e| e.at_boundary(FETCH_SONGS_FAILED))?;

        Ok(Page::new(items, total, page_request))
    }
}
