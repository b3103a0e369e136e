//! Genre use cases

use std::sync::Arc;

use auth::{AuthenticatedUser, RoleName};
use kernel::id::{GenreId, SongId};

use crate::application::access::CREATORS;
use crate::application::lookup::{require_genre, require_songs};
use crate::domain::entity::genre::Genre;
use crate::domain::repository::{GenreRepository, SongRepository};
use crate::error::{CatalogError, CatalogResult};

pub struct GenreInput {
    pub name: Option<String>,
    pub songs: Option<Vec<SongId>>,
}

pub struct GenreUseCase<R>
where
    R: GenreRepository + SongRepository,
{
    repo: Arc<R>,
}

impl<R> GenreUseCase<R>
where
    R: GenreRepository + SongRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> CatalogResult<Vec<Genre>> {
        self.repo.list_genres().await
    }

    pub async fn get(&self, genre_id: &GenreId) -> CatalogResult<Genre> {
        require_genre(self.repo.as_ref(), genre_id).await
    }

    pub async fn create(&self, caller: &AuthenticatedUser, input: GenreInput) -> CatalogResult<Genre> {
        caller.require_any(CREATORS)?;

        let songs = input.songs.unwrap_or_default();
        let genre = Genre::new(input.name.as_deref().unwrap_or_default(), songs)?;
        require_songs(self.repo.as_ref(), &genre.songs).await?;

        self.repo.insert_genre(&genre).await?;
        tracing::info!(genre_id = %genre.genre_id, name = %genre.name, "Genre created");
        Ok(genre)
    }

    /// Songs are kept when the input leaves them out
    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        genre_id: &GenreId,
        input: GenreInput,
    ) -> CatalogResult<Genre> {
        caller.require_any(&[RoleName::ADMIN])?;

        self.get(genre_id).await?;
        if let Some(songs) = &input.songs {
            require_songs(self.repo.as_ref(), songs).await?;
        }

        let name = input.name.unwrap_or_default();
        let genre = self
            .modify(genre_id, |genre| {
                genre.rename(&name)?;
                if let Some(songs) = input.songs {
                    genre.songs = songs;
                }
                Ok(())
            })
            .await?;
        tracing::info!(genre_id = %genre.genre_id, "Genre updated");
        Ok(genre)
    }

    pub async fn add_songs(
        &self,
        caller: &AuthenticatedUser,
        genre_id: &GenreId,
        songs: &[SongId],
    ) -> CatalogResult<Genre> {
        caller.require_any(CREATORS)?;

        if songs.is_empty() {
            return Err(CatalogError::validation("songs is required"));
        }
        self.get(genre_id).await?;
        require_songs(self.repo.as_ref(), songs).await?;

        let genre = self.modify(genre_id, |genre| genre.add_songs(songs)).await?;
        tracing::info!(genre_id = %genre.genre_id, added = songs.len(), "Songs added to genre");
        Ok(genre)
    }

    async fn modify<F>(&self, genre_id: &GenreId, change: F) -> CatalogResult<Genre>
    where
        F: FnOnce(&mut Genre) -> CatalogResult<()> + Send,
    {
        self.repo
            .modify_genre(genre_id, change)
            .await?
            .ok_or_else(|| CatalogError::not_found("Genre", genre_id))
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, genre_id: &GenreId) -> CatalogResult<()> {
        caller.require_any(&[RoleName::ADMIN])?;

        if !self.repo.remove_genre(genre_id).await? {
            return Err(CatalogError::not_found("Genre", genre_id));
        }
        tracing::info!(genre_id = %genre_id, "Genre deleted");
        Ok(())
    }
}
