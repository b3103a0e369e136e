//! PostgreSQL Repository Implementation
//!
//! Reference lists are `UUID[]` columns. Listing formats and history
//! streams are ordered JSONB arrays.

use chrono::{DateTime, Utc};
use kernel::id::{ArtistId, CommentId, GenreId, HistoryId, ListedSongId, SongId, UserId};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::{
    artist::Artist,
    comment::Comment,
    genre::Genre,
    history::{History, StreamEntry},
    listing::{Format, ListedSong},
    song::Song,
};
use crate::domain::repository::{
    ArtistRepository, CommentRepository, GenreRepository, HistoryRepository, ListingRepository,
    SongRepository, UserDirectory,
};
use crate::domain::song_query::SongQuery;
use crate::error::{CatalogError, CatalogResult};

const SONG_COLUMNS: &str = r#"
    song_id,
    artist_id,
    genre_id,
    title,
    duration,
    explicit,
    license,
    description,
    published,
    cover_art,
    likes,
    shares,
    purchases,
    streams
"#;

const COMMENT_COLUMNS: &str =
    "comment_id, listed_song_id, posted_by, parent_id, replied_by, message, flagged, replies, votes";

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Genres
// ============================================================================

impl GenreRepository for PgCatalogRepository {
    async fn list_genres(&self) -> CatalogResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, GenreRow>("SELECT genre_id, name, songs FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GenreRow::into_genre).collect())
    }

    async fn find_genre(&self, genre_id: &GenreId) -> CatalogResult<Option<Genre>> {
        let row = sqlx::query_as::<_, GenreRow>("SELECT genre_id, name, songs FROM genres WHERE genre_id = $1")
            .bind(genre_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(GenreRow::into_genre))
    }

    async fn insert_genre(&self, genre: &Genre) -> CatalogResult<()> {
        sqlx::query("INSERT INTO genres (genre_id, name, songs) VALUES ($1, $2, $3)")
            .bind(genre.genre_id.as_uuid())
            .bind(&genre.name)
            .bind(SongId::to_uuids(&genre.songs))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn modify_genre<F>(&self, genre_id: &GenreId, change: F) -> CatalogResult<Option<Genre>>
    where
        F: FnOnce(&mut Genre) -> CatalogResult<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, GenreRow>(
            "SELECT genre_id, name, songs FROM genres WHERE genre_id = $1 FOR UPDATE",
        )
        .bind(genre_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mut genre) = row.map(GenreRow::into_genre) else {
            return Ok(None);
        };
        change(&mut genre)?;

        sqlx::query("UPDATE genres SET name = $2, songs = $3 WHERE genre_id = $1")
            .bind(genre.genre_id.as_uuid())
            .bind(&genre.name)
            .bind(SongId::to_uuids(&genre.songs))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(genre))
    }

    async fn remove_genre(&self, genre_id: &GenreId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM genres WHERE genre_id = $1")
            .bind(genre_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                still_referenced_or(e, format!("Genre {genre_id} is still used by songs or artists"))
            })?
            .rows_affected();
        Ok(deleted > 0)
    }
}

// ============================================================================
// Artists
// ============================================================================

impl ArtistRepository for PgCatalogRepository {
    async fn list_artists(&self) -> CatalogResult<Vec<Artist>> {
        let rows = sqlx::query_as::<_, ArtistRow>(
            "SELECT artist_id, user_id, username, genre_id, songs FROM artists ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ArtistRow::into_artist).collect())
    }

    async fn find_artist(&self, artist_id: &ArtistId) -> CatalogResult<Option<Artist>> {
        let row = sqlx::query_as::<_, ArtistRow>(
            "SELECT artist_id, user_id, username, genre_id, songs FROM artists WHERE artist_id = $1",
        )
        .bind(artist_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ArtistRow::into_artist))
    }

    async fn find_artist_by_user(&self, user_id: &UserId) -> CatalogResult<Option<Artist>> {
        let row = sqlx::query_as::<_, ArtistRow>(
            "SELECT artist_id, user_id, username, genre_id, songs FROM artists WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ArtistRow::into_artist))
    }

    async fn insert_artist(&self, artist: &Artist) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO artists (artist_id, user_id, username, genre_id, songs)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(artist.artist_id.as_uuid())
        .bind(artist.user_id.as_uuid())
        .bind(&artist.username)
        .bind(artist.genre_id.as_uuid())
        .bind(SongId::to_uuids(&artist.songs))
        .execute(&self.pool)
        .await
        .map_err(|e| profile_taken_or(e, &artist.user_id))?;
        Ok(())
    }

    async fn save_artist(&self, artist: &Artist) -> CatalogResult<()> {
        update_artist(&self.pool, artist).await
    }

    async fn modify_artist<F>(&self, artist_id: &ArtistId, change: F) -> CatalogResult<Option<Artist>>
    where
        F: FnOnce(&mut Artist) -> CatalogResult<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ArtistRow>(
            "SELECT artist_id, user_id, username, genre_id, songs FROM artists WHERE artist_id = $1 FOR UPDATE",
        )
        .bind(artist_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mut artist) = row.map(ArtistRow::into_artist) else {
            return Ok(None);
        };
        change(&mut artist)?;
        update_artist(&mut *tx, &artist).await?;

        tx.commit().await?;
        Ok(Some(artist))
    }
}

async fn update_artist<'e, E>(executor: E, artist: &Artist) -> CatalogResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE artists SET
            user_id = $2,
            username = $3,
            genre_id = $4,
            songs = $5
        WHERE artist_id = $1
        "#,
    )
    .bind(artist.artist_id.as_uuid())
    .bind(artist.user_id.as_uuid())
    .bind(&artist.username)
    .bind(artist.genre_id.as_uuid())
    .bind(SongId::to_uuids(&artist.songs))
    .execute(executor)
    .await
    .map_err(|e| profile_taken_or(e, &artist.user_id))?;
    Ok(())
}

// ============================================================================
// Songs
// ============================================================================

impl SongRepository for PgCatalogRepository {
    async fn search_songs(&self, query: &SongQuery) -> CatalogResult<Vec<Song>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {SONG_COLUMNS} FROM songs WHERE TRUE"));

        if let Some(genre_id) = &query.genre {
            qb.push(" AND genre_id = ").push_bind(*genre_id.as_uuid());
        }
        if let Some(artist_id) = &query.artist {
            qb.push(" AND artist_id = ").push_bind(*artist_id.as_uuid());
        }
        if let Some(title) = query.title_filter() {
            qb.push(" AND strpos(lower(title), ").push_bind(title).push(") > 0");
        }
        if let Some(min) = query.min_duration {
            qb.push(" AND duration >= ").push_bind(min);
        }
        if let Some(max) = query.max_duration {
            qb.push(" AND duration <= ").push_bind(max);
        }
        // column and direction come from closed enums, never from input
        qb.push(format!(
            " ORDER BY {} {}, song_id",
            query.sort.column(),
            query.order.as_sql()
        ));

        let rows = qb.build_query_as::<SongRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(SongRow::into_song).collect())
    }

    async fn find_song(&self, song_id: &SongId) -> CatalogResult<Option<Song>> {
        let sql = format!("SELECT {SONG_COLUMNS} FROM songs WHERE song_id = $1");
        let row = sqlx::query_as::<_, SongRow>(&sql)
            .bind(song_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SongRow::into_song))
    }

    async fn existing_song_ids(&self, song_ids: &[SongId]) -> CatalogResult<Vec<SongId>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT song_id FROM songs WHERE song_id = ANY($1)")
            .bind(SongId::to_uuids(song_ids))
            .fetch_all(&self.pool)
            .await?;
        Ok(SongId::from_uuids(ids))
    }

    async fn insert_song(&self, song: &Song) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO songs (
                song_id,
                artist_id,
                genre_id,
                title,
                duration,
                explicit,
                license,
                description,
                published,
                cover_art,
                likes,
                shares,
                purchases,
                streams
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(song.song_id.as_uuid())
        .bind(song.artist_id.as_uuid())
        .bind(song.genre_id.as_uuid())
        .bind(&song.title)
        .bind(song.duration)
        .bind(song.explicit)
        .bind(&song.license)
        .bind(song.description.as_deref())
        .bind(song.published)
        .bind(song.cover_art.as_deref())
        .bind(song.likes)
        .bind(song.shares)
        .bind(song.purchases)
        .bind(song.streams)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_song(&self, song: &Song) -> CatalogResult<()> {
        sqlx::query(
            r#"
            UPDATE songs SET
                artist_id = $2,
                genre_id = $3,
                title = $4,
                duration = $5,
                explicit = $6,
                license = $7,
                description = $8,
                published = $9,
                cover_art = $10,
                likes = $11,
                shares = $12,
                purchases = $13,
                streams = $14
            WHERE song_id = $1
            "#,
        )
        .bind(song.song_id.as_uuid())
        .bind(song.artist_id.as_uuid())
        .bind(song.genre_id.as_uuid())
        .bind(&song.title)
        .bind(song.duration)
        .bind(song.explicit)
        .bind(&song.license)
        .bind(song.description.as_deref())
        .bind(song.published)
        .bind(song.cover_art.as_deref())
        .bind(song.likes)
        .bind(song.shares)
        .bind(song.purchases)
        .bind(song.streams)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Also drops the song from genre, artist and history lists.
    /// Listings (and their comments) go with it through the foreign keys.
    async fn remove_song(&self, song_id: &SongId) -> CatalogResult<bool> {
        let mut tx = self.pool.begin().await?;

        detach_songs(&mut tx, &[*song_id.as_uuid()]).await?;

        let deleted = sqlx::query("DELETE FROM songs WHERE song_id = $1")
            .bind(song_id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}

/// Drop `song_ids` from genre, artist and history lists
async fn detach_songs(tx: &mut sqlx::Transaction<'_, Postgres>, song_ids: &[Uuid]) -> CatalogResult<()> {
    if song_ids.is_empty() {
        return Ok(());
    }

    for table in ["genres", "artists"] {
        sqlx::query(&format!(
            r#"
            UPDATE {table} SET songs = ARRAY(
                SELECT id FROM unnest(songs) WITH ORDINALITY AS t(id, position)
                WHERE NOT (id = ANY($1))
                ORDER BY position
            )
            WHERE songs && $1
            "#
        ))
        .bind(song_ids)
        .execute(&mut **tx)
        .await?;
    }

    let song_keys: Vec<String> = song_ids.iter().map(Uuid::to_string).collect();
    sqlx::query(
        r#"
        UPDATE histories SET streams = (
            SELECT COALESCE(jsonb_agg(entry ORDER BY position), '[]'::jsonb)
            FROM jsonb_array_elements(streams) WITH ORDINALITY AS t(entry, position)
            WHERE NOT (entry->>'song' = ANY($1))
        )
        WHERE EXISTS (
            SELECT 1 FROM jsonb_array_elements(streams) AS e(entry)
            WHERE e.entry->>'song' = ANY($1)
        )
        "#,
    )
    .bind(&song_keys)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ============================================================================
// Listings
// ============================================================================

impl ListingRepository for PgCatalogRepository {
    async fn list_listings(&self) -> CatalogResult<Vec<ListedSong>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            "SELECT listed_song_id, creator, song_id, formats, price FROM listed_songs ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ListingRow::into_listing).collect())
    }

    async fn find_listing(&self, listing_id: &ListedSongId) -> CatalogResult<Option<ListedSong>> {
        let row = sqlx::query_as::<_, ListingRow>(
            "SELECT listed_song_id, creator, song_id, formats, price FROM listed_songs WHERE listed_song_id = $1",
        )
        .bind(listing_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ListingRow::into_listing))
    }

    async fn insert_listing(&self, listing: &ListedSong) -> CatalogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO listed_songs (listed_song_id, creator, song_id, formats, price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(listing.listed_song_id.as_uuid())
        .bind(listing.creator.as_uuid())
        .bind(listing.song.as_uuid())
        .bind(Json(&listing.formats))
        .bind(listing.price)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_listing(&self, listing_id: &ListedSongId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM listed_songs WHERE listed_song_id = $1")
            .bind(listing_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

// ============================================================================
// Comments
// ============================================================================

impl CommentRepository for PgCatalogRepository {
    async fn list_comments(&self, listing_id: Option<&ListedSongId>) -> CatalogResult<Vec<Comment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE $1::uuid IS NULL OR listed_song_id = $1 ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(listing_id.map(|id| *id.as_uuid()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn find_comment(&self, comment_id: &CommentId) -> CatalogResult<Option<Comment>> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = $1");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(comment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CommentRow::into_comment))
    }

    async fn insert_comment(&self, comment: &Comment) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = &comment.parent {
            let mut parent = lock_comment(&mut tx, parent_id)
                .await?
                .ok_or_else(|| CatalogError::not_found("Comment", parent_id))?;
            parent.attach_reply(comment.comment_id);
            save_replies(&mut tx, &parent).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO comments (
                comment_id,
                listed_song_id,
                posted_by,
                parent_id,
                replied_by,
                message,
                flagged,
                replies,
                votes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(comment.comment_id.as_uuid())
        .bind(comment.listed_song.as_uuid())
        .bind(comment.posted_by.as_uuid())
        .bind(comment.parent.map(CommentId::into_uuid))
        .bind(CommentId::to_uuids(&comment.replied_by))
        .bind(&comment.message)
        .bind(&comment.flagged)
        .bind(comment.replies)
        .bind(comment.votes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn modify_comment<F>(&self, comment_id: &CommentId, change: F) -> CatalogResult<Option<Comment>>
    where
        F: FnOnce(&mut Comment) -> CatalogResult<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let Some(mut comment) = lock_comment(&mut tx, comment_id).await? else {
            return Ok(None);
        };
        change(&mut comment)?;

        sqlx::query("UPDATE comments SET message = $2, flagged = $3, votes = $4 WHERE comment_id = $1")
            .bind(comment.comment_id.as_uuid())
            .bind(&comment.message)
            .bind(&comment.flagged)
            .bind(comment.votes)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(comment))
    }

    async fn remove_comment(&self, comment_id: &CommentId) -> CatalogResult<bool> {
        let mut tx = self.pool.begin().await?;

        let parent_id = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT parent_id FROM comments WHERE comment_id = $1",
        )
        .bind(comment_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(parent_id) = parent_id else {
            return Ok(false);
        };

        // parent before child, the order a parent's own delete takes
        if let Some(parent_id) = parent_id.map(CommentId::from_uuid) {
            if let Some(mut parent) = lock_comment(&mut tx, &parent_id).await? {
                parent.detach_reply(comment_id);
                save_replies(&mut tx, &parent).await?;
            }
        }
        let deleted = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}

async fn lock_comment(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    comment_id: &CommentId,
) -> CatalogResult<Option<Comment>> {
    let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, CommentRow>(&sql)
        .bind(comment_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.map(CommentRow::into_comment))
}

async fn save_replies(tx: &mut sqlx::Transaction<'_, Postgres>, comment: &Comment) -> CatalogResult<()> {
    sqlx::query("UPDATE comments SET replied_by = $2, replies = $3 WHERE comment_id = $1")
        .bind(comment.comment_id.as_uuid())
        .bind(CommentId::to_uuids(&comment.replied_by))
        .bind(comment.replies)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

// ============================================================================
// Histories
// ============================================================================

impl HistoryRepository for PgCatalogRepository {
    async fn list_histories(&self) -> CatalogResult<Vec<History>> {
        let rows = sqlx::query_as::<_, HistoryRow>("SELECT history_id, user_id, streams FROM histories")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(HistoryRow::into_history).collect())
    }

    async fn find_history(&self, history_id: &HistoryId) -> CatalogResult<Option<History>> {
        let row = sqlx::query_as::<_, HistoryRow>(
            "SELECT history_id, user_id, streams FROM histories WHERE history_id = $1",
        )
        .bind(history_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(HistoryRow::into_history))
    }

    async fn find_history_by_user(&self, user_id: &UserId) -> CatalogResult<Option<History>> {
        let row = sqlx::query_as::<_, HistoryRow>(
            "SELECT history_id, user_id, streams FROM histories WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(HistoryRow::into_history))
    }

    async fn insert_history(&self, history: &History) -> CatalogResult<()> {
        sqlx::query("INSERT INTO histories (history_id, user_id, streams) VALUES ($1, $2, $3)")
            .bind(history.history_id.as_uuid())
            .bind(history.user_id.as_uuid())
            .bind(Json(&history.streams))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let is_unique = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if is_unique {
                    CatalogError::Conflict(format!("User {} already has a history", history.user_id))
                } else {
                    CatalogError::Database(e)
                }
            })?;
        Ok(())
    }

    async fn modify_history_by_user<F>(&self, user_id: &UserId, change: F) -> CatalogResult<Option<History>>
    where
        F: FnOnce(&mut History) -> CatalogResult<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, HistoryRow>(
            "SELECT history_id, user_id, streams FROM histories WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mut history) = row.map(HistoryRow::into_history) else {
            return Ok(None);
        };
        change(&mut history)?;

        sqlx::query("UPDATE histories SET streams = $2 WHERE history_id = $1")
            .bind(history.history_id.as_uuid())
            .bind(Json(&history.streams))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(history))
    }
}

// ============================================================================
// Users (owned by auth)
// ============================================================================

impl UserDirectory for PgCatalogRepository {
    async fn user_id_by_name(&self, username: &str) -> CatalogResult<Option<UserId>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM users WHERE username_canonical = $1")
            .bind(username.trim().to_ascii_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(id.map(UserId::from_uuid))
    }

    async fn user_exists(&self, user_id: &UserId) -> CatalogResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Listings on the user's songs and their comments go with the songs
    /// through the foreign keys.
    async fn remove_user_content(&self, user_id: &UserId) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        let song_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT s.song_id FROM songs s JOIN artists a ON a.artist_id = s.artist_id WHERE a.user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *tx)
        .await?;
        detach_songs(&mut tx, &song_ids).await?;

        let comment_ids = sqlx::query_scalar::<_, Uuid>("SELECT comment_id FROM comments WHERE posted_by = $1")
            .bind(user_id.as_uuid())
            .fetch_all(&mut *tx)
            .await?;
        if !comment_ids.is_empty() {
            sqlx::query(
                r#"
                UPDATE comments SET
                    replies = GREATEST(
                        replies - (SELECT count(*) FROM unnest(replied_by) AS r(id) WHERE r.id = ANY($1))::int,
                        0
                    ),
                    replied_by = ARRAY(
                        SELECT id FROM unnest(replied_by) WITH ORDINALITY AS t(id, position)
                        WHERE NOT (id = ANY($1))
                        ORDER BY position
                    )
                WHERE replied_by && $1
                "#,
            )
            .bind(&comment_ids)
            .execute(&mut *tx)
            .await?;
        }

        for sql in [
            "DELETE FROM comments WHERE posted_by = $1",
            "DELETE FROM listed_songs WHERE creator = $1",
            "DELETE FROM artists WHERE user_id = $1",
            "DELETE FROM histories WHERE user_id = $1",
        ] {
            sqlx::query(sql)
                .bind(user_id.as_uuid())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            user_id = %user_id,
            songs = song_ids.len(),
            comments = comment_ids.len(),
            "Catalog content removed for user"
        );
        Ok(())
    }
}

// ============================================================================
// Error mapping
// ============================================================================

fn profile_taken_or(err: sqlx::Error, user_id: &UserId) -> CatalogError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if is_unique {
        CatalogError::Conflict(format!("User {user_id} already has an artist profile"))
    } else {
        CatalogError::Database(err)
    }
}

fn still_referenced_or(err: sqlx::Error, message: String) -> CatalogError {
    let is_fk = err
        .as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation());
    if is_fk { CatalogError::Conflict(message) } else { CatalogError::Database(err) }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct GenreRow {
    genre_id: Uuid,
    name: String,
    songs: Vec<Uuid>,
}

impl GenreRow {
    fn into_genre(self) -> Genre {
        Genre {
            genre_id: GenreId::from_uuid(self.genre_id),
            name: self.name,
            songs: SongId::from_uuids(self.songs),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ArtistRow {
    artist_id: Uuid,
    user_id: Uuid,
    username: String,
    genre_id: Uuid,
    songs: Vec<Uuid>,
}

impl ArtistRow {
    fn into_artist(self) -> Artist {
        Artist {
            artist_id: ArtistId::from_uuid(self.artist_id),
            user_id: UserId::from_uuid(self.user_id),
            username: self.username,
            genre_id: GenreId::from_uuid(self.genre_id),
            songs: SongId::from_uuids(self.songs),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SongRow {
    song_id: Uuid,
    artist_id: Uuid,
    genre_id: Uuid,
    title: String,
    duration: i32,
    explicit: bool,
    license: String,
    description: Option<String>,
    published: DateTime<Utc>,
    cover_art: Option<String>,
    likes: i64,
    shares: i64,
    purchases: i64,
    streams: i64,
}

impl SongRow {
    fn into_song(self) -> Song {
        Song {
            song_id: SongId::from_uuid(self.song_id),
            artist_id: ArtistId::from_uuid(self.artist_id),
            genre_id: GenreId::from_uuid(self.genre_id),
            title: self.title,
            duration: self.duration,
            explicit: self.explicit,
            license: self.license,
            description: self.description,
            published: self.published,
            cover_art: self.cover_art,
            likes: self.likes,
            shares: self.shares,
            purchases: self.purchases,
            streams: self.streams,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    listed_song_id: Uuid,
    creator: Uuid,
    song_id: Uuid,
    formats: Json<Vec<Format>>,
    price: f64,
}

impl ListingRow {
    fn into_listing(self) -> ListedSong {
        ListedSong {
            listed_song_id: ListedSongId::from_uuid(self.listed_song_id),
            creator: UserId::from_uuid(self.creator),
            song: SongId::from_uuid(self.song_id),
            formats: self.formats.0,
            price: self.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    listed_song_id: Uuid,
    posted_by: Uuid,
    parent_id: Option<Uuid>,
    replied_by: Vec<Uuid>,
    message: String,
    flagged: String,
    replies: i32,
    votes: i32,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            comment_id: CommentId::from_uuid(self.comment_id),
            listed_song: ListedSongId::from_uuid(self.listed_song_id),
            posted_by: UserId::from_uuid(self.posted_by),
            parent: self.parent_id.map(CommentId::from_uuid),
            replied_by: CommentId::from_uuids(self.replied_by),
            message: self.message,
            flagged: self.flagged,
            replies: self.replies,
            votes: self.votes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    history_id: Uuid,
    user_id: Uuid,
    streams: Json<Vec<StreamEntry>>,
}

impl HistoryRow {
    fn into_history(self) -> History {
        History {
            history_id: HistoryId::from_uuid(self.history_id),
            user_id: UserId::from_uuid(self.user_id),
            streams: self.streams.0,
        }
    }
}
