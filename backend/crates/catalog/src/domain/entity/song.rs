//! Song Entity

use chrono::{DateTime, Utc};
use kernel::id::{ArtistId, GenreId, SongId};
use serde::Serialize;

use super::required_text;
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_LICENSE: &str = "Creative Commons";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub song_id: SongId,
    pub artist_id: ArtistId,
    pub genre_id: GenreId,
    pub title: String,
    /// Seconds
    pub duration: i32,
    pub explicit: bool,
    pub license: String,
    pub description: Option<String>,
    pub published: DateTime<Utc>,
    pub cover_art: Option<String>,
    pub likes: i64,
    pub shares: i64,
    pub purchases: i64,
    pub streams: i64,
}

/// Everything a client supplies when creating or replacing a song
#[derive(Debug, Clone)]
pub struct SongDraft {
    pub artist_id: ArtistId,
    pub genre_id: GenreId,
    pub title: String,
    pub duration: i32,
    pub explicit: Option<bool>,
    pub license: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub cover_art: Option<String>,
}

/// Partial update. `None` leaves the field alone; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default)]
pub struct SongPatch {
    pub genre_id: Option<GenreId>,
    pub title: Option<String>,
    pub duration: Option<i32>,
    pub explicit: Option<bool>,
    pub license: Option<String>,
    pub description: Option<Option<String>>,
    pub published: Option<DateTime<Utc>>,
    pub cover_art: Option<Option<String>>,
    pub likes: Option<i64>,
    pub shares: Option<i64>,
    pub purchases: Option<i64>,
    pub streams: Option<i64>,
}

impl Song {
    pub fn new(draft: SongDraft) -> CatalogResult<Self> {
        let mut song = Self {
            song_id: SongId::new(),
            artist_id: draft.artist_id,
            genre_id: draft.genre_id,
            title: String::new(),
            duration: 0,
            explicit: false,
            license: DEFAULT_LICENSE.to_string(),
            description: None,
            published: Utc::now(),
            cover_art: None,
            likes: 0,
            shares: 0,
            purchases: 0,
            streams: 0,
        };
        song.replace(draft)?;
        Ok(song)
    }

    /// Overwrites every descriptive field. Counters are kept.
    pub fn replace(&mut self, draft: SongDraft) -> CatalogResult<()> {
        let title = required_text("Title", &draft.title)?;
        check_duration(draft.duration)?;
        let license = match draft.license {
            Some(license) => required_text("License", license)?,
            None => DEFAULT_LICENSE.to_string(),
        };

        self.artist_id = draft.artist_id;
        self.genre_id = draft.genre_id;
        self.title = title;
        self.duration = draft.duration;
        self.explicit = draft.explicit.unwrap_or(false);
        self.license = license;
        self.description = draft.description;
        self.published = draft.published.unwrap_or_else(Utc::now);
        self.cover_art = draft.cover_art;
        Ok(())
    }

    /// All-or-nothing: the song is untouched when any field is invalid
    pub fn apply(&mut self, patch: SongPatch) -> CatalogResult<()> {
        let title = patch
            .title
            .map(|t| required_text("Title", t))
            .transpose()?;
        let license = patch
            .license
            .map(|l| required_text("License", l))
            .transpose()?;
        if let Some(duration) = patch.duration {
            check_duration(duration)?;
        }
        for (name, value) in [
            ("likes", patch.likes),
            ("shares", patch.shares),
            ("purchases", patch.purchases),
            ("streams", patch.streams),
        ] {
            if value.is_some_and(|v| v < 0) {
                return Err(CatalogError::validation(format!(
                    "{name} cannot be negative"
                )));
            }
        }

        if let Some(genre_id) = patch.genre_id {
            self.genre_id = genre_id;
        }
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(explicit) = patch.explicit {
            self.explicit = explicit;
        }
        if let Some(license) = license {
            self.license = license;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        if let Some(cover_art) = patch.cover_art {
            self.cover_art = cover_art;
        }
        self.likes = patch.likes.unwrap_or(self.likes);
        self.shares = patch.shares.unwrap_or(self.shares);
        self.purchases = patch.purchases.unwrap_or(self.purchases);
        self.streams = patch.streams.unwrap_or(self.streams);
        Ok(())
    }
}

fn check_duration(duration: i32) -> CatalogResult<()> {
    if duration <= 0 {
        return Err(CatalogError::validation(
            "Duration must be a positive number of seconds",
        ));
    }
    Ok(())
}
