//! Domain models for the song catalog
//!
//! This module contains the song entity, its closed genre set, and the
//! create/update payloads together with their validation rules.

use crate::error::{FieldError, LibraryError, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_ARTIST_LEN: usize = 100;
pub const MAX_ALBUM_LEN: usize = 200;

// =============================================================================
// Genre
// =============================================================================

/// Closed set of genres a song can be filed under.
///
/// Declaration order is the order genres appear in statistics output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Rock,
    Pop,
    Jazz,
    Classical,
    #[serde(rename = "Hip-Hop")]
    HipHop,
    Electronic,
    Country,
    #[serde(rename = "R&B")]
    RnB,
    Reggae,
    Blues,
    Metal,
    Folk,
    Other,
}

impl Genre {
    pub const ALL: [Genre; 13] = [
        Genre::Rock,
        Genre::Pop,
        Genre::Jazz,
        Genre::Classical,
        Genre::HipHop,
        Genre::Electronic,
        Genre::Country,
        Genre::RnB,
        Genre::Reggae,
        Genre::Blues,
        Genre::Metal,
        Genre::Folk,
        Genre::Other,
    ];

    /// Wire/storage name of the genre
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Rock => "Rock",
            Genre::Pop => "Pop",
            Genre::Jazz => "Jazz",
            Genre::Classical => "Classical",
            Genre::HipHop => "Hip-Hop",
            Genre::Electronic => "Electronic",
            Genre::Country => "Country",
            Genre::RnB => "R&B",
            Genre::Reggae => "Reggae",
            Genre::Blues => "Blues",
            Genre::Metal => "Metal",
            Genre::Folk => "Folk",
            Genre::Other => "Other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    /// Exact, case-sensitive match against the wire names.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| format!("Unknown genre '{}'", s))
    }
}

// =============================================================================
// Song
// =============================================================================

/// Song with its optional audio attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Unique identifier
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Genre,
    /// Duration in seconds
    pub duration: i64,
    /// Public URL of the attached audio file
    pub file_url: Option<String>,
    /// Original name of the uploaded file
    pub file_name: Option<String>,
    /// Size of the attached file in bytes
    pub file_size: Option<i64>,
    /// Creation time (unix milliseconds)
    pub created_at: i64,
    /// Last update time (unix milliseconds)
    pub updated_at: i64,
    /// Soft-delete marker (unix milliseconds)
    pub deleted_at: Option<i64>,
}

impl Song {
    /// Validate song data against the catalog invariants
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        check_text(&mut errors, "title", &self.title, MAX_TITLE_LEN, true);
        check_text(&mut errors, "artist", &self.artist, MAX_ARTIST_LEN, true);
        if let Some(album) = &self.album {
            check_text(&mut errors, "album", album, MAX_ALBUM_LEN, false);
        }

        if self.duration < 0 {
            errors.push(FieldError::new("duration", "Duration cannot be negative"));
        }

        if matches!(self.file_size, Some(size) if size < 0) {
            errors.push(FieldError::new("fileSize", "File size cannot be negative"));
        }

        let attached = [
            self.file_url.is_some(),
            self.file_name.is_some(),
            self.file_size.is_some(),
        ];
        if attached.contains(&true) && attached.contains(&false) {
            errors.push(FieldError::new(
                "file",
                "fileUrl, fileName and fileSize must be set together",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LibraryError::validation(errors))
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Raw `songs` row; genre is kept as text until converted into [`Song`].
#[derive(Debug, Clone, FromRow)]
pub struct SongRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: String,
    pub duration: i64,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl TryFrom<SongRecord> for Song {
    type Error = LibraryError;

    fn try_from(record: SongRecord) -> Result<Self> {
        let genre = record.genre.parse::<Genre>().map_err(|message| {
            LibraryError::Internal(format!("Corrupt song row {}: {}", record.id, message))
        })?;

        Ok(Song {
            id: record.id,
            title: record.title,
            artist: record.artist,
            album: record.album,
            genre,
            duration: record.duration,
            file_url: record.file_url,
            file_name: record.file_name,
            file_size: record.file_size,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        })
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Audio file metadata recorded on a song once the upload succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub file_url: String,
    pub file_name: String,
    pub file_size: i64,
}

/// Payload for creating a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    pub genre: Genre,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub file: Option<FileAttachment>,
}

impl NewSong {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, genre: Genre) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: None,
            genre,
            duration: None,
            file: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration(mut self, seconds: i64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    /// Build the entity with trimmed text, a fresh id and the given timestamp
    pub fn into_song(self, now_millis: i64) -> Song {
        let file = self.file;
        Song {
            id: Uuid::new_v4().to_string(),
            title: self.title.trim().to_string(),
            artist: self.artist.trim().to_string(),
            album: self
                .album
                .map(|album| album.trim().to_string())
                .filter(|album| !album.is_empty()),
            genre: self.genre,
            duration: self.duration.unwrap_or(0),
            file_url: file.as_ref().map(|f| f.file_url.trim().to_string()),
            file_name: file.as_ref().map(|f| f.file_name.trim().to_string()),
            file_size: file.as_ref().map(|f| f.file_size),
            created_at: now_millis,
            updated_at: now_millis,
            deleted_at: None,
        }
    }
}

/// Partial update payload; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
}

impl SongUpdate {
    /// Drop blank strings so only meaningful fields remain.
    pub fn cleaned(self) -> SongUpdate {
        SongUpdate {
            title: non_blank(self.title),
            artist: non_blank(self.artist),
            album: non_blank(self.album),
            genre: self.genre,
            duration: self.duration,
            file_url: non_blank(self.file_url),
            file_name: non_blank(self.file_name),
            file_size: self.file_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.genre.is_none()
            && self.duration.is_none()
            && self.file_url.is_none()
            && self.file_name.is_none()
            && self.file_size.is_none()
    }

    /// Apply the present fields to `song`
    pub fn apply_to(&self, song: &mut Song, now_millis: i64) {
        if let Some(title) = &self.title {
            song.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            song.artist = artist.clone();
        }
        if let Some(album) = &self.album {
            song.album = Some(album.clone());
        }
        if let Some(genre) = self.genre {
            song.genre = genre;
        }
        if let Some(duration) = self.duration {
            song.duration = duration;
        }
        if let Some(file_url) = &self.file_url {
            song.file_url = Some(file_url.clone());
        }
        if let Some(file_name) = &self.file_name {
            song.file_name = Some(file_name.clone());
        }
        if let Some(file_size) = self.file_size {
            song.file_size = Some(file_size);
        }
        song.updated_at = now_millis;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_text(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize, required: bool) {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", field)));
    } else if trimmed.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("{} cannot exceed {} characters", field, max),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Song {
        NewSong::new("  Hotel California ", "Eagles", Genre::Rock)
            .with_album("Hotel California")
            .with_duration(391)
            .into_song(1_700_000_000_000)
    }

    #[test]
    fn test_genre_has_thirteen_values() {
        assert_eq!(Genre::ALL.len(), 13);
        let mut sorted = Genre::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Genre::ALL.to_vec());
    }

    #[test]
    fn test_genre_parse_is_exact() {
        assert_eq!("Rock".parse::<Genre>(), Ok(Genre::Rock));
        assert_eq!("Hip-Hop".parse::<Genre>(), Ok(Genre::HipHop));
        assert_eq!("R&B".parse::<Genre>(), Ok(Genre::RnB));
        assert!("rock".parse::<Genre>().is_err());
        assert!("Polka".parse::<Genre>().is_err());
        assert!("".parse::<Genre>().is_err());
    }

    #[test]
    fn test_genre_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Genre::HipHop).unwrap(), "\"Hip-Hop\"");
        let genre: Genre = serde_json::from_str("\"R&B\"").unwrap();
        assert_eq!(genre, Genre::RnB);
        for genre in Genre::ALL {
            let json = serde_json::to_string(&genre).unwrap();
            assert_eq!(json, format!("\"{}\"", genre.as_str()));
        }
    }

    #[test]
    fn test_new_song_trims_and_defaults() {
        let song = song();
        assert_eq!(song.title, "Hotel California");
        assert_eq!(song.duration, 391);
        assert_eq!(song.created_at, song.updated_at);
        assert!(song.deleted_at.is_none());
        assert!(Uuid::parse_str(&song.id).is_ok());

        let bare = NewSong::new("Intro", "Nobody", Genre::Other)
            .with_album("   ")
            .into_song(0);
        assert_eq!(bare.duration, 0);
        assert_eq!(bare.album, None);
        assert_eq!(bare.file_url, None);
    }

    #[test]
    fn test_validate_collects_field_errors() {
        let mut song = song();
        assert!(song.validate().is_ok());

        song.title = "   ".to_string();
        song.artist = "a".repeat(MAX_ARTIST_LEN + 1);
        song.duration = -1;
        song.file_url = Some("http://localhost:3000/uploads/a.mp3".to_string());
        song.file_name = Some("a.mp3".to_string());
        song.file_size = Some(-5);

        let err = song.validate().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "artist", "duration", "fileSize"]);
    }

    #[test]
    fn test_file_attachment_is_all_or_nothing() {
        let mut song = song();
        assert!(song.validate().is_ok());

        song.file_url = Some("http://localhost:3000/uploads/a.mp3".to_string());
        let err = song.validate().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["file"]);

        song.file_name = Some("a.mp3".to_string());
        assert!(song.validate().is_err());

        song.file_size = Some(1024);
        assert!(song.validate().is_ok());

        song.file_url = None;
        assert!(song.validate().is_err());
    }

    #[test]
    fn test_update_cleaned_drops_blank_strings() {
        let update = SongUpdate {
            title: Some("   ".to_string()),
            artist: Some("".to_string()),
            album: Some(" New Album ".to_string()),
            ..Default::default()
        }
        .cleaned();

        assert!(update.title.is_none());
        assert!(update.artist.is_none());
        assert_eq!(update.album.as_deref(), Some("New Album"));
        assert!(!update.is_empty());

        let empty = SongUpdate {
            title: Some(" ".to_string()),
            file_name: Some("\t".to_string()),
            ..Default::default()
        }
        .cleaned();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_update_apply_to() {
        let mut song = song();
        let update = SongUpdate {
            genre: Some(Genre::Country),
            duration: Some(10),
            ..Default::default()
        };
        update.apply_to(&mut song, 1_800_000_000_000);

        assert_eq!(song.genre, Genre::Country);
        assert_eq!(song.duration, 10);
        assert_eq!(song.title, "Hotel California");
        assert_eq!(song.updated_at, 1_800_000_000_000);
    }

    #[test]
    fn test_song_serializes_camel_case() {
        let json = serde_json::to_value(song()).unwrap();
        assert_eq!(json["genre"], "Rock");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("fileUrl").is_some());
    }

    #[test]
    fn test_record_with_unknown_genre_is_rejected() {
        let record = SongRecord {
            id: "x".into(),
            title: "t".into(),
            artist: "a".into(),
            album: None,
            genre: "Polka".into(),
            duration: 0,
            file_url: None,
            file_name: None,
            file_size: None,
            created_at: 0,
            updated_at: 0,
            deleted_at: None,
        };
        assert!(Song::try_from(record).is_err());
    }
}
