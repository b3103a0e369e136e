//! Request DTOs
//!
//! Entities serialize themselves for responses; these are the inbound
//! shapes, all camelCase.

use chrono::{DateTime, Utc};
use kernel::id::{ArtistId, CommentId, GenreId, SongId, UserId};
use serde::{Deserialize, Deserializer};

use crate::domain::entity::history::StreamEntry;
use crate::domain::entity::listing::Format;
use crate::domain::entity::song::{SongDraft, SongPatch};
use crate::domain::song_query::{SongQuery, SongSort, SortOrder};
use crate::error::{CatalogError, CatalogResult};

// ============================================================================
// Genres
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRequest {
    pub name: Option<String>,
    pub songs: Option<Vec<SongId>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongsRequest {
    #[serde(default)]
    pub songs: Vec<SongId>,
}

// ============================================================================
// Artists
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRequest {
    pub username: Option<String>,
    pub user_id: Option<UserId>,
    pub genre_id: Option<GenreId>,
    pub songs: Option<Vec<SongId>>,
}

// ============================================================================
// Songs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub artist_id: Option<ArtistId>,
    pub genre_id: Option<GenreId>,
    pub title: Option<String>,
    pub duration: Option<i32>,
    pub explicit: Option<bool>,
    pub license: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub cover_art: Option<String>,
}

impl SongRequest {
    pub fn into_draft(self) -> CatalogResult<SongDraft> {
        let (Some(artist_id), Some(genre_id), Some(title), Some(duration)) =
            (self.artist_id, self.genre_id, self.title, self.duration)
        else {
            return Err(CatalogError::validation(
                "artistId, genreId, title and duration are required",
            ));
        };

        Ok(SongDraft {
            artist_id,
            genre_id,
            title,
            duration,
            explicit: self.explicit,
            license: self.license,
            description: self.description,
            published: self.published,
            cover_art: self.cover_art,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatchRequest {
    pub genre_id: Option<GenreId>,
    pub title: Option<String>,
    pub duration: Option<i32>,
    pub explicit: Option<bool>,
    pub license: Option<String>,
    /// `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub published: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub cover_art: Option<Option<String>>,
    pub likes: Option<i64>,
    pub shares: Option<i64>,
    pub purchases: Option<i64>,
    pub streams: Option<i64>,
}

impl From<SongPatchRequest> for SongPatch {
    fn from(req: SongPatchRequest) -> Self {
        Self {
            genre_id: req.genre_id,
            title: req.title,
            duration: req.duration,
            explicit: req.explicit,
            license: req.license,
            description: req.description,
            published: req.published,
            cover_art: req.cover_art,
            likes: req.likes,
            shares: req.shares,
            purchases: req.purchases,
            streams: req.streams,
        }
    }
}

/// Tells an explicit `null` (`Some(None)`) from a missing key (`None`)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `GET /api/songs?genre=..&title=..&sort=likes&order=desc`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongQueryParams {
    pub genre: Option<GenreId>,
    pub artist: Option<ArtistId>,
    pub title: Option<String>,
    pub min_duration: Option<i32>,
    pub max_duration: Option<i32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl SongQueryParams {
    pub fn into_query(self) -> CatalogResult<SongQuery> {
        Ok(SongQuery {
            genre: self.genre,
            artist: self.artist,
            title: self.title,
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            sort: self.sort.as_deref().map(str::parse::<SongSort>).transpose()?.unwrap_or_default(),
            order: self.order.as_deref().map(str::parse::<SortOrder>).transpose()?.unwrap_or_default(),
        })
    }
}

// ============================================================================
// Listings and comments
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub song: Option<SongId>,
    pub price: Option<f64>,
    #[serde(default)]
    pub formats: Vec<Format>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub message: Option<String>,
    pub reply_to: Option<CommentId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentStateRequest {
    pub flag: Option<String>,
    pub vote: Option<i32>,
}

// ============================================================================
// Histories
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHistoryRequest {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHistoryRequest {
    pub streams: Option<Vec<StreamEntry>>,
}
