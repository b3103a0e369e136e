//! Reference resolution
//!
//! A referenced id must exist before it is stored. Each miss is a 404
//! naming the id.

use kernel::id::{ArtistId, GenreId, SongId, UserId};

use crate::domain::entity::{artist::Artist, genre::Genre, song::Song};
use crate::domain::repository::{ArtistRepository, GenreRepository, SongRepository, UserDirectory};
use crate::error::{CatalogError, CatalogResult};

pub async fn require_genre<R: GenreRepository>(repo: &R, genre_id: &GenreId) -> CatalogResult<Genre> {
    repo.find_genre(genre_id)
        .await?
        .ok_or_else(|| CatalogError::not_found("Genre", genre_id))
}

pub async fn require_artist<R: ArtistRepository>(
    repo: &R,
    artist_id: &ArtistId,
) -> CatalogResult<Artist> {
    repo.find_artist(artist_id)
        .await?
        .ok_or_else(|| CatalogError::not_found("Artist", artist_id))
}

pub async fn require_song<R: SongRepository>(repo: &R, song_id: &SongId) -> CatalogResult<Song> {
    repo.find_song(song_id)
        .await?
        .ok_or_else(|| CatalogError::not_found("Song", song_id))
}

/// Reports the first missing song in the order given
pub async fn require_songs<R: SongRepository>(repo: &R, song_ids: &[SongId]) -> CatalogResult<()> {
    if song_ids.is_empty() {
        return Ok(());
    }
    let existing = repo.existing_song_ids(song_ids).await?;
    match song_ids.iter().find(|id| !existing.contains(id)) {
        Some(missing) => Err(CatalogError::not_found("Song", missing)),
        None => Ok(()),
    }
}

pub async fn require_user<R: UserDirectory>(repo: &R, user_id: &UserId) -> CatalogResult<()> {
    if repo.user_exists(user_id).await? {
        Ok(())
    } else {
        Err(CatalogError::not_found("User", user_id))
    }
}
