//! Song repository trait and SQLite implementation

use crate::error::{LibraryError, Result};
use crate::filter::{contains_pattern, fold_case, Condition, Predicate};
use crate::models::{Song, SongRecord};
use crate::query::{SongSort, SortOrder};
use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

/// Grouping key for aggregate queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    Genre,
    Artist,
    /// The `(album, artist)` pair; equal album names by different artists
    /// form separate groups.
    AlbumArtist,
}

/// One row of an aggregate query.
///
/// `key` holds the genre, artist or album name depending on the grouping.
/// `artist` is only set for [`Grouping::AlbumArtist`], and `albums` (distinct
/// non-empty album names) only for [`Grouping::Artist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub key: Option<String>,
    pub artist: Option<String>,
    pub songs: u64,
    pub albums: u64,
}

/// Song repository interface for data access operations
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Find a song by its ID, deleted or not
    async fn find_by_id(&self, id: &str) -> Result<Option<Song>>;

    /// Insert a new song
    ///
    /// # Errors
    /// Returns error if a song with the same ID exists or validation fails
    async fn insert(&self, song: &Song) -> Result<()>;

    /// Persist every field of an existing song
    ///
    /// # Errors
    /// Returns `NotFound` if the song does not exist
    async fn update(&self, song: &Song) -> Result<()>;

    /// Remove a song row
    ///
    /// # Returns
    /// - `Ok(true)` if the song was deleted
    /// - `Ok(false)` if the song was not found
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Set or clear the soft-delete marker; `Ok(false)` if the song was not found
    async fn set_deleted_at(&self, id: &str, deleted_at: Option<i64>, updated_at: i64)
        -> Result<bool>;

    /// Matching songs in `sort` order, skipping `skip` rows and returning at most `limit`
    async fn find(
        &self,
        predicate: &Predicate,
        sort: SongSort,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<Song>>;

    /// Number of matching songs
    async fn count(&self, predicate: &Predicate) -> Result<u64>;

    /// Number of distinct groups among matching songs
    async fn count_distinct(&self, predicate: &Predicate, grouping: Grouping) -> Result<u64>;

    /// Per-group rollup of matching songs.
    ///
    /// Artist and album groupings come back ordered by song count descending,
    /// then name ascending.
    async fn aggregate(&self, predicate: &Predicate, grouping: Grouping) -> Result<Vec<GroupRow>>;
}

/// SQLite implementation of SongRepository
pub struct SqliteSongRepository {
    pool: SqlitePool,
}

impl SqliteSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct GroupRecord {
    name: Option<String>,
    artist: Option<String>,
    songs: i64,
    albums: i64,
}

impl From<GroupRecord> for GroupRow {
    fn from(record: GroupRecord) -> Self {
        GroupRow {
            key: record.name,
            artist: record.artist,
            songs: record.songs.max(0) as u64,
            albums: record.albums.max(0) as u64,
        }
    }
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Song>> {
        let record = sqlx::query_as::<_, SongRecord>("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        record.map(Song::try_from).transpose()
    }

    async fn insert(&self, song: &Song) -> Result<()> {
        song.validate()?;

        sqlx::query(
            r#"
            INSERT INTO songs (
                id, title, artist, album,
                title_folded, artist_folded, album_folded,
                genre, duration, file_url, file_name, file_size,
                created_at, updated_at, deleted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.id)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(fold_case(&song.title))
        .bind(fold_case(&song.artist))
        .bind(song.album.as_deref().map(fold_case))
        .bind(song.genre.as_str())
        .bind(song.duration)
        .bind(&song.file_url)
        .bind(&song.file_name)
        .bind(song.file_size)
        .bind(song.created_at)
        .bind(song.updated_at)
        .bind(song.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, song: &Song) -> Result<()> {
        song.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE songs SET
                title = ?, artist = ?, album = ?,
                title_folded = ?, artist_folded = ?, album_folded = ?,
                genre = ?, duration = ?, file_url = ?, file_name = ?, file_size = ?,
                updated_at = ?, deleted_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(fold_case(&song.title))
        .bind(fold_case(&song.artist))
        .bind(song.album.as_deref().map(fold_case))
        .bind(song.genre.as_str())
        .bind(song.duration)
        .bind(&song.file_url)
        .bind(&song.file_name)
        .bind(song.file_size)
        .bind(song.updated_at)
        .bind(song.deleted_at)
        .bind(&song.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LibraryError::not_found("Song", &song.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_deleted_at(
        &self,
        id: &str,
        deleted_at: Option<i64>,
        updated_at: i64,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE songs SET deleted_at = ?, updated_at = ? WHERE id = ?")
            .bind(deleted_at)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        sort: SongSort,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<Song>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM songs");
        push_predicate(&mut builder, predicate);
        builder
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(match sort.order {
                SortOrder::Asc => " ASC",
                SortOrder::Desc => " DESC",
            })
            .push(", id ASC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

        let records = builder
            .build_query_as::<SongRecord>()
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(Song::try_from).collect()
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM songs");
        push_predicate(&mut builder, predicate);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn count_distinct(&self, predicate: &Predicate, grouping: Grouping) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM (SELECT 1 FROM songs");
        push_predicate(&mut builder, predicate);
        builder.push(" GROUP BY ").push(group_columns(grouping)).push(")");

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn aggregate(&self, predicate: &Predicate, grouping: Grouping) -> Result<Vec<GroupRow>> {
        let select = match grouping {
            Grouping::Genre => {
                "SELECT genre AS name, NULL AS artist, COUNT(*) AS songs, 0 AS albums FROM songs"
            }
            Grouping::Artist => {
                "SELECT artist AS name, NULL AS artist, COUNT(*) AS songs, \
                 COUNT(DISTINCT NULLIF(album, '')) AS albums FROM songs"
            }
            Grouping::AlbumArtist => {
                "SELECT album AS name, artist, COUNT(*) AS songs, 0 AS albums FROM songs"
            }
        };

        let mut builder = QueryBuilder::<Sqlite>::new(select);
        push_predicate(&mut builder, predicate);
        builder.push(" GROUP BY ").push(group_columns(grouping));
        builder.push(match grouping {
            Grouping::Genre => " ORDER BY name ASC",
            Grouping::Artist => " ORDER BY songs DESC, name ASC",
            Grouping::AlbumArtist => " ORDER BY songs DESC, name ASC, artist ASC",
        });

        let records = builder
            .build_query_as::<GroupRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records.into_iter().map(GroupRow::from).collect())
    }
}

fn group_columns(grouping: Grouping) -> &'static str {
    match grouping {
        Grouping::Genre => "genre",
        Grouping::Artist => "artist",
        Grouping::AlbumArtist => "album, artist",
    }
}

/// Append `WHERE ...` for the predicate; nothing for an empty predicate.
fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    for (index, condition) in predicate.conditions().iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });

        match condition {
            Condition::GenreIs(genre) => {
                builder.push("genre = ").push_bind(genre.as_str());
            }
            Condition::Contains { field, needle } => {
                builder
                    .push(field.folded_column())
                    .push(" LIKE ")
                    .push_bind(contains_pattern(needle))
                    .push(" ESCAPE '\\'");
            }
            Condition::AnyContains { fields, needle } => {
                let pattern = contains_pattern(needle);
                builder.push("(");
                for (position, field) in fields.iter().enumerate() {
                    if position > 0 {
                        builder.push(" OR ");
                    }
                    builder
                        .push(field.folded_column())
                        .push(" LIKE ")
                        .push_bind(pattern.clone())
                        .push(" ESCAPE '\\'");
                }
                builder.push(")");
            }
            Condition::CreatedFrom(millis) => {
                builder.push("created_at >= ").push_bind(*millis);
            }
            Condition::CreatedUntil(millis) => {
                builder.push("created_at <= ").push_bind(*millis);
            }
            Condition::NotDeleted => {
                builder.push("deleted_at IS NULL");
            }
            Condition::Never => {
                builder.push("0 = 1");
            }
        }
    }
}
