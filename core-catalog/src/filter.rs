//! Translation of raw query parameters into storage predicates.
//!
//! Nothing in here fails: unknown genres, blank strings and unparseable
//! dates are dropped so the caller simply gets a broader result set.

use crate::models::{Genre, MAX_ALBUM_LEN, MAX_ARTIST_LEN, MAX_TITLE_LEN};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Raw listing parameters as received from the transport layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongQueryParams {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Raw statistics parameters as received from the transport layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQueryParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// Text columns that take part in substring matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Title,
    Artist,
    Album,
}

impl TextField {
    pub fn column(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Artist => "artist",
            TextField::Album => "album",
        }
    }

    /// Lowercased copy of the column, written alongside it on every insert and update
    pub fn folded_column(self) -> &'static str {
        match self {
            TextField::Title => "title_folded",
            TextField::Artist => "artist_folded",
            TextField::Album => "album_folded",
        }
    }

    /// Longest value the column can hold, in characters
    pub fn max_len(self) -> usize {
        match self {
            TextField::Title => MAX_TITLE_LEN,
            TextField::Artist => MAX_ARTIST_LEN,
            TextField::Album => MAX_ALBUM_LEN,
        }
    }
}

/// A single clause of a [`Predicate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    GenreIs(Genre),
    /// Case-insensitive substring match on one column
    Contains { field: TextField, needle: String },
    /// Case-insensitive substring match on any of the columns
    AnyContains {
        fields: Vec<TextField>,
        needle: String,
    },
    CreatedFrom(i64),
    CreatedUntil(i64),
    NotDeleted,
    /// Matches no row
    Never,
}

/// Conjunction of conditions; an empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Listing filter after normalisation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub genre: Option<Genre>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub search: Option<String>,
    pub include_deleted: bool,
}

impl SongFilter {
    pub fn from_params(params: &SongQueryParams) -> Self {
        Self {
            genre: parse_genre(params.genre.as_deref()),
            artist: present(params.artist.as_deref()),
            album: present(params.album.as_deref()),
            title: present(params.title.as_deref()),
            search: present(params.search.as_deref()),
            include_deleted: false,
        }
    }

    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn to_predicate(&self) -> Predicate {
        let mut predicate = Predicate::new();

        if !self.include_deleted {
            predicate.push(Condition::NotDeleted);
        }
        if let Some(genre) = self.genre {
            predicate.push(Condition::GenreIs(genre));
        }
        push_contains(&mut predicate, TextField::Artist, &self.artist);
        push_contains(&mut predicate, TextField::Album, &self.album);
        push_contains(&mut predicate, TextField::Title, &self.title);
        if let Some(search) = &self.search {
            let fields = vec![TextField::Title, TextField::Artist, TextField::Album];
            let longest = fields.iter().map(|field| field.max_len()).max().unwrap_or(0);
            predicate.push(if search.chars().count() > longest {
                Condition::Never
            } else {
                Condition::AnyContains {
                    fields,
                    needle: search.clone(),
                }
            });
        }

        predicate
    }
}

/// Statistics filter after normalisation; dates are unix milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsFilter {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub genre: Option<Genre>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl StatsFilter {
    pub fn from_params(params: &StatsQueryParams) -> Self {
        Self {
            start: present(params.start_date.as_deref())
                .and_then(|value| parse_date(&value, DateBound::Start)),
            end: present(params.end_date.as_deref())
                .and_then(|value| parse_date(&value, DateBound::End)),
            genre: parse_genre(params.genre.as_deref()),
            artist: present(params.artist.as_deref()),
            album: present(params.album.as_deref()),
        }
    }

    pub fn to_predicate(&self) -> Predicate {
        let mut predicate = Predicate::new().and(Condition::NotDeleted);

        if let Some(start) = self.start {
            predicate.push(Condition::CreatedFrom(start));
        }
        if let Some(end) = self.end {
            predicate.push(Condition::CreatedUntil(end));
        }
        if let Some(genre) = self.genre {
            predicate.push(Condition::GenreIs(genre));
        }
        push_contains(&mut predicate, TextField::Artist, &self.artist);
        push_contains(&mut predicate, TextField::Album, &self.album);

        predicate
    }
}

/// Escape LIKE metacharacters so user text matches literally under `ESCAPE '\'`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lowercase form used on both sides of a substring match
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// `%needle%` pattern over the folded columns, with the needle lowercased and escaped.
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(&fold_case(needle)))
}

/// Text longer than the column can hold never matches, so it becomes
/// [`Condition::Never`] instead of an oversized LIKE pattern.
fn push_contains(predicate: &mut Predicate, field: TextField, value: &Option<String>) {
    if let Some(needle) = value {
        predicate.push(if needle.chars().count() > field.max_len() {
            Condition::Never
        } else {
            Condition::Contains {
                field,
                needle: needle.clone(),
            }
        });
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_genre(value: Option<&str>) -> Option<Genre> {
    value.and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Clone, Copy)]
enum DateBound {
    Start,
    End,
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` widened to the whole UTC day
fn parse_date(value: &str, bound: DateBound) -> Option<i64> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.timestamp_millis());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = match bound {
        DateBound::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        DateBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?,
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)).timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SongQueryParams {
        SongQueryParams::default()
    }

    #[test]
    fn test_empty_params_only_hide_deleted() {
        let predicate = SongFilter::from_params(&params()).to_predicate();
        assert_eq!(predicate.conditions(), &[Condition::NotDeleted]);

        let predicate = SongFilter::from_params(&params()).with_deleted().to_predicate();
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_unknown_genre_is_ignored() {
        let filter = SongFilter::from_params(&SongQueryParams {
            genre: Some("Polka".into()),
            ..params()
        });
        assert_eq!(filter.genre, None);

        let filter = SongFilter::from_params(&SongQueryParams {
            genre: Some("rock".into()),
            ..params()
        });
        assert_eq!(filter.genre, None);

        let filter = SongFilter::from_params(&SongQueryParams {
            genre: Some("Hip-Hop".into()),
            ..params()
        });
        assert_eq!(filter.genre, Some(Genre::HipHop));
    }

    #[test]
    fn test_blank_text_is_absent() {
        let filter = SongFilter::from_params(&SongQueryParams {
            artist: Some("   ".into()),
            search: Some("".into()),
            title: Some(" Hotel ".into()),
            ..params()
        });
        assert_eq!(filter.artist, None);
        assert_eq!(filter.search, None);
        assert_eq!(filter.title.as_deref(), Some("Hotel"));
    }

    #[test]
    fn test_search_spans_three_columns() {
        let predicate = SongFilter::from_params(&SongQueryParams {
            genre: Some("Rock".into()),
            search: Some("cal".into()),
            ..params()
        })
        .to_predicate();

        assert_eq!(
            predicate.conditions(),
            &[
                Condition::NotDeleted,
                Condition::GenreIs(Genre::Rock),
                Condition::AnyContains {
                    fields: vec![TextField::Title, TextField::Artist, TextField::Album],
                    needle: "cal".into(),
                },
            ]
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
        assert_eq!(contains_pattern("EaGle_"), "%eagle\\_%");
    }

    #[test]
    fn test_contains_pattern_folds_unicode_case() {
        assert_eq!(contains_pattern("АРИЯ"), "%ария%");
        assert_eq!(contains_pattern("ÉDITH"), "%édith%");
        assert_eq!(fold_case("Édith Piaf"), "édith piaf");
    }

    #[test]
    fn test_text_longer_than_any_column_matches_nothing() {
        let predicate = SongFilter::from_params(&SongQueryParams {
            search: Some("a".repeat(60_000)),
            artist: Some("b".repeat(MAX_ARTIST_LEN + 1)),
            title: Some("c".repeat(MAX_TITLE_LEN)),
            ..params()
        })
        .to_predicate();

        assert_eq!(
            predicate.conditions(),
            &[
                Condition::NotDeleted,
                Condition::Never,
                Condition::Contains {
                    field: TextField::Title,
                    needle: "c".repeat(MAX_TITLE_LEN),
                },
                Condition::Never,
            ]
        );

        let stats = StatsFilter {
            album: Some("é".repeat(MAX_ALBUM_LEN + 1)),
            ..Default::default()
        };
        assert_eq!(
            stats.to_predicate().conditions(),
            &[Condition::NotDeleted, Condition::Never]
        );
    }

    #[test]
    fn test_stats_dates() {
        let filter = StatsFilter::from_params(&StatsQueryParams {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            ..Default::default()
        });
        assert_eq!(filter.start, Some(1_704_067_200_000));
        assert_eq!(filter.end, Some(1_706_745_599_999));

        let filter = StatsFilter::from_params(&StatsQueryParams {
            start_date: Some("2024-01-01T12:00:00Z".into()),
            end_date: Some("not a date".into()),
            ..Default::default()
        });
        assert_eq!(filter.start, Some(1_704_110_400_000));
        assert_eq!(filter.end, None);
    }

    #[test]
    fn test_stats_predicate_open_ended() {
        let filter = StatsFilter {
            end: Some(42),
            artist: Some("a".into()),
            ..Default::default()
        };
        assert_eq!(
            filter.to_predicate().conditions(),
            &[
                Condition::NotDeleted,
                Condition::CreatedUntil(42),
                Condition::Contains {
                    field: TextField::Artist,
                    needle: "a".into()
                },
            ]
        );
    }
}
