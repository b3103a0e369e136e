//! Genre Entity

use kernel::id::{GenreId, SongId};
use serde::Serialize;

use super::required_text;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub genre_id: GenreId,
    pub name: String,
    pub songs: Vec<SongId>,
}

impl Genre {
    pub fn new(name: &str, songs: Vec<SongId>) -> CatalogResult<Self> {
        Ok(Self {
            genre_id: GenreId::new(),
            name: required_text("Genre name", name)?,
            songs,
        })
    }

    pub fn rename(&mut self, name: &str) -> CatalogResult<()> {
        self.name = required_text("Genre name", name)?;
        Ok(())
    }

    /// Appends in order. Nothing changes if any song is already present,
    /// or listed twice.
    pub fn add_songs(&mut self, songs: &[SongId]) -> CatalogResult<()> {
        for (i, song) in songs.iter().enumerate() {
            if self.songs.contains(song) || songs[..i].contains(song) {
                return Err(CatalogError::Conflict(format!(
                    "Song {song} is already in genre {}",
                    self.name
                )));
            }
        }
        self.songs.extend_from_slice(songs);
        Ok(())
    }
}
