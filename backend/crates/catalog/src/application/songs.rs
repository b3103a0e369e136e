//! Song use cases
//!
//! A song belongs to an artist profile; the profile's user owns the song.

use std::sync::Arc;

use auth::AuthenticatedUser;
use kernel::id::SongId;

use crate::application::access::{CREATORS, require_owner_or_admin};
use crate::application::lookup::{require_artist, require_genre, require_song};
use crate::domain::entity::song::{Song, SongDraft, SongPatch};
use crate::domain::repository::{ArtistRepository, GenreRepository, SongRepository, UserDirectory};
use crate::domain::song_query::SongQuery;
use crate::error::{CatalogError, CatalogResult};

pub struct SongUseCase<R>
where
    R: SongRepository + ArtistRepository + GenreRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> SongUseCase<R>
where
    R: SongRepository + ArtistRepository + GenreRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &SongQuery) -> CatalogResult<Vec<Song>> {
        query.validate()?;
        self.repo.search_songs(query).await
    }

    pub async fn get(&self, song_id: &SongId) -> CatalogResult<Song> {
        require_song(self.repo.as_ref(), song_id).await
    }

    pub async fn create(&self, caller: &AuthenticatedUser, draft: SongDraft) -> CatalogResult<Song> {
        caller.require_any(CREATORS)?;
        self.check_references(caller, &draft).await?;

        let song = Song::new(draft)?;
        self.repo.insert_song(&song).await?;

        tracing::info!(
            song_id = %song.song_id,
            artist_id = %song.artist_id,
            title = %song.title,
            "Song created"
        );
        Ok(song)
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        song_id: &SongId,
        draft: SongDraft,
    ) -> CatalogResult<Song> {
        let mut song = self.get(song_id).await?;
        self.require_song_owner(caller, &song).await?;
        self.check_references(caller, &draft).await?;

        song.replace(draft)?;
        self.repo.save_song(&song).await?;

        tracing::info!(song_id = %song.song_id, "Song replaced");
        Ok(song)
    }

    pub async fn update_properties(
        &self,
        caller: &AuthenticatedUser,
        song_id: &SongId,
        patch: SongPatch,
    ) -> CatalogResult<Song> {
        let mut song = self.get(song_id).await?;
        self.require_song_owner(caller, &song).await?;
        if let Some(genre_id) = &patch.genre_id {
            require_genre(self.repo.as_ref(), genre_id).await?;
        }

        song.apply(patch)?;
        self.repo.save_song(&song).await?;

        tracing::info!(song_id = %song.song_id, "Song properties updated");
        Ok(song)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, song_id: &SongId) -> CatalogResult<()> {
        let song = self.get(song_id).await?;
        self.require_song_owner(caller, &song).await?;

        if !self.repo.remove_song(song_id).await? {
            return Err(CatalogError::not_found("Song", song_id));
        }
        tracing::info!(song_id = %song_id, "Song deleted");
        Ok(())
    }

    /// Artist and genre must exist; a non-admin must own the artist
    async fn check_references(&self, caller: &AuthenticatedUser, draft: &SongDraft) -> CatalogResult<()> {
        let artist = require_artist(self.repo.as_ref(), &draft.artist_id).await?;
        require_genre(self.repo.as_ref(), &draft.genre_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &artist.user_id).await
    }

    async fn require_song_owner(&self, caller: &AuthenticatedUser, song: &Song) -> CatalogResult<()> {
        if caller.is_admin() {
            return Ok(());
        }
        let artist = require_artist(self.repo.as_ref(), &song.artist_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &artist.user_id).await
    }
}
