//! Artist Entity
//!
//! One artist profile per user. `songs` is most recent first.

use kernel::id::{ArtistId, GenreId, SongId, UserId};
use serde::Serialize;

use super::required_text;
use crate::error::CatalogResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub artist_id: ArtistId,
    pub user_id: UserId,
    pub username: String,
    pub genre_id: GenreId,
    pub songs: Vec<SongId>,
}

impl Artist {
    pub fn new(username: &str, user_id: UserId, genre_id: GenreId) -> CatalogResult<Self> {
        Ok(Self {
            artist_id: ArtistId::new(),
            user_id,
            username: required_text("Username", username)?,
            genre_id,
            songs: Vec::new(),
        })
    }

    /// Inserts at the front. Returns false if the song was already there.
    pub fn add_song(&mut self, song: SongId) -> bool {
        if self.songs.contains(&song) {
            return false;
        }
        self.songs.insert(0, song);
        true
    }

    pub fn remove_song(&mut self, song: &SongId) -> bool {
        let before = self.songs.len();
        self.songs.retain(|s| s != song);
        self.songs.len() < before
    }
}
