//! Artist profile use cases

use std::sync::Arc;

use auth::AuthenticatedUser;
use kernel::id::{ArtistId, GenreId, SongId, UserId};

use crate::application::access::{CREATORS, caller_id, require_owner_or_admin};
use crate::application::lookup::{require_artist, require_genre, require_song, require_songs, require_user};
use crate::domain::entity::artist::Artist;
use crate::domain::repository::{ArtistRepository, GenreRepository, SongRepository, UserDirectory};
use crate::error::{CatalogError, CatalogResult};

pub struct ArtistInput {
    pub username: Option<String>,
    pub user_id: Option<UserId>,
    pub genre_id: Option<GenreId>,
    pub songs: Option<Vec<SongId>>,
}

impl ArtistInput {
    fn required(&self) -> CatalogResult<(&str, UserId, GenreId)> {
        match (self.username.as_deref(), self.user_id, self.genre_id) {
            (Some(username), Some(user_id), Some(genre_id)) => Ok((username, user_id, genre_id)),
            _ => Err(CatalogError::validation(
                "username, userId and genreId are required",
            )),
        }
    }
}

pub struct ArtistUseCase<R>
where
    R: ArtistRepository + GenreRepository + SongRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> ArtistUseCase<R>
where
    R: ArtistRepository + GenreRepository + SongRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> CatalogResult<Vec<Artist>> {
        self.repo.list_artists().await
    }

    pub async fn get(&self, artist_id: &ArtistId) -> CatalogResult<Artist> {
        require_artist(self.repo.as_ref(), artist_id).await
    }

    /// Artists may only create their own profile; admins may create any
    pub async fn create(&self, caller: &AuthenticatedUser, input: ArtistInput) -> CatalogResult<Artist> {
        caller.require_any(CREATORS)?;
        let (username, user_id, genre_id) = input.required()?;

        if !caller.is_admin() && caller_id(self.repo.as_ref(), caller).await? != user_id {
            tracing::warn!(username = %caller.username, "Artist profile for another user refused");
            return Err(CatalogError::Forbidden);
        }
        require_genre(self.repo.as_ref(), &genre_id).await?;
        require_user(self.repo.as_ref(), &user_id).await?;
        self.ensure_no_profile(&user_id).await?;

        let artist = Artist::new(username, user_id, genre_id)?;
        self.repo.insert_artist(&artist).await?;

        tracing::info!(artist_id = %artist.artist_id, user_id = %user_id, "Artist created");
        Ok(artist)
    }

    /// Full replace. Only an admin may move the profile to another user.
    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        artist_id: &ArtistId,
        input: ArtistInput,
    ) -> CatalogResult<Artist> {
        let current = self.get(artist_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &current.user_id).await?;

        let (username, user_id, genre_id) = input.required()?;
        let songs = input.songs.clone().unwrap_or_default();

        if user_id != current.user_id {
            if !caller.is_admin() {
                return Err(CatalogError::Forbidden);
            }
            require_user(self.repo.as_ref(), &user_id).await?;
            self.ensure_no_profile(&user_id).await?;
        }
        require_genre(self.repo.as_ref(), &genre_id).await?;
        require_songs(self.repo.as_ref(), &songs).await?;

        let mut artist = Artist::new(username, user_id, genre_id)?;
        artist.artist_id = current.artist_id;
        for song in songs.into_iter().rev() {
            artist.add_song(song);
        }

        self.repo.save_artist(&artist).await?;
        tracing::info!(artist_id = %artist.artist_id, "Artist updated");
        Ok(artist)
    }

    pub async fn add_song(
        &self,
        caller: &AuthenticatedUser,
        artist_id: &ArtistId,
        song_id: &SongId,
    ) -> CatalogResult<Artist> {
        let artist = self.get(artist_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &artist.user_id).await?;
        require_song(self.repo.as_ref(), song_id).await?;

        let mut added = false;
        let artist = self
            .modify(artist_id, |artist| {
                added = artist.add_song(*song_id);
                Ok(())
            })
            .await?;
        if added {
            tracing::info!(artist_id = %artist.artist_id, song_id = %song_id, "Song added to artist");
        }
        Ok(artist)
    }

    pub async fn remove_song(
        &self,
        caller: &AuthenticatedUser,
        artist_id: &ArtistId,
        song_id: &SongId,
    ) -> CatalogResult<Artist> {
        let artist = self.get(artist_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &artist.user_id).await?;
        require_song(self.repo.as_ref(), song_id).await?;

        let mut removed = false;
        let artist = self
            .modify(artist_id, |artist| {
                removed = artist.remove_song(song_id);
                Ok(())
            })
            .await?;
        if removed {
            tracing::info!(artist_id = %artist.artist_id, song_id = %song_id, "Song removed from artist");
        }
        Ok(artist)
    }

    async fn modify<F>(&self, artist_id: &ArtistId, change: F) -> CatalogResult<Artist>
    where
        F: FnOnce(&mut Artist) -> CatalogResult<()> + Send,
    {
        self.repo
            .modify_artist(artist_id, change)
            .await?
            .ok_or_else(|| CatalogError::not_found("Artist", artist_id))
    }

    async fn ensure_no_profile(&self, user_id: &UserId) -> CatalogResult<()> {
        if self.repo.find_artist_by_user(user_id).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "User {user_id} already has an artist profile"
            )));
        }
        Ok(())
    }
}
