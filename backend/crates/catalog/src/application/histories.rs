//! Listening history use cases
//!
//! Histories are addressed by their own id for reads and by user id for
//! writes. Only the owning user or an admin sees or changes one.

use std::sync::Arc;

use auth::{AuthenticatedUser, RoleName};
use kernel::id::{HistoryId, SongId, UserId};

use crate::application::access::{caller_id, require_owner_or_admin};
use crate::application::lookup::{require_song, require_songs, require_user};
use crate::domain::entity::history::{History, StreamEntry};
use crate::domain::repository::{HistoryRepository, SongRepository, UserDirectory};
use crate::error::{CatalogError, CatalogResult};

pub struct HistoryUseCase<R>
where
    R: HistoryRepository + SongRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> HistoryUseCase<R>
where
    R: HistoryRepository + SongRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, caller: &AuthenticatedUser) -> CatalogResult<Vec<History>> {
        caller.require_any(&[RoleName::ADMIN])?;
        self.repo.list_histories().await
    }

    pub async fn get(&self, caller: &AuthenticatedUser, history_id: &HistoryId) -> CatalogResult<History> {
        let history = self
            .repo
            .find_history(history_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("History", history_id))?;
        require_owner_or_admin(self.repo.as_ref(), caller, &history.user_id).await?;
        Ok(history)
    }

    pub async fn create(&self, caller: &AuthenticatedUser, user_id: Option<UserId>) -> CatalogResult<History> {
        let Some(user_id) = user_id else {
            return Err(CatalogError::validation("userId is required"));
        };
        if !caller.is_admin() && caller_id(self.repo.as_ref(), caller).await? != user_id {
            tracing::warn!(username = %caller.username, "History for another user refused");
            return Err(CatalogError::Forbidden);
        }
        require_user(self.repo.as_ref(), &user_id).await?;
        if self.repo.find_history_by_user(&user_id).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "User {user_id} already has a history"
            )));
        }

        let history = History::new(user_id);
        self.repo.insert_history(&history).await?;

        tracing::info!(history_id = %history.history_id, user_id = %user_id, "History created");
        Ok(history)
    }

    /// Replace the whole stream list; an empty list is allowed
    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        user_id: &UserId,
        streams: Vec<StreamEntry>,
    ) -> CatalogResult<History> {
        self.owned_history(caller, user_id).await?;

        for (i, entry) in streams.iter().enumerate() {
            if entry.times_streamed < 1 {
                return Err(CatalogError::validation("timesStreamed must be at least 1"));
            }
            if streams[..i].iter().any(|e| e.song == entry.song) {
                return Err(CatalogError::validation(format!(
                    "Song {} appears more than once",
                    entry.song
                )));
            }
        }
        let songs: Vec<SongId> = streams.iter().map(|e| e.song).collect();
        require_songs(self.repo.as_ref(), &songs).await?;

        let history = self
            .modify(user_id, |history| {
                history.streams = streams;
                Ok(())
            })
            .await?;

        tracing::info!(history_id = %history.history_id, entries = history.streams.len(), "History replaced");
        Ok(history)
    }

    pub async fn add_stream(
        &self,
        caller: &AuthenticatedUser,
        user_id: &UserId,
        song_id: &SongId,
    ) -> CatalogResult<History> {
        self.owned_history(caller, user_id).await?;
        require_song(self.repo.as_ref(), song_id).await?;

        let history = self
            .modify(user_id, |history| {
                history.record_stream(*song_id);
                Ok(())
            })
            .await?;

        tracing::debug!(history_id = %history.history_id, song_id = %song_id, "Stream recorded");
        Ok(history)
    }

    pub async fn remove_stream(
        &self,
        caller: &AuthenticatedUser,
        user_id: &UserId,
        song_id: &SongId,
    ) -> CatalogResult<History> {
        self.owned_history(caller, user_id).await?;

        self.modify(user_id, |history| {
            history.remove_stream(song_id);
            Ok(())
        })
        .await
    }

    async fn modify<F>(&self, user_id: &UserId, change: F) -> CatalogResult<History>
    where
        F: FnOnce(&mut History) -> CatalogResult<()> + Send,
    {
        self.repo
            .modify_history_by_user(user_id, change)
            .await?
            .ok_or_else(|| CatalogError::not_found("History for user", user_id))
    }

    async fn owned_history(&self, caller: &AuthenticatedUser, user_id: &UserId) -> CatalogResult<History> {
        let history = self
            .repo
            .find_history_by_user(user_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("History for user", user_id))?;
        require_owner_or_admin(self.repo.as_ref(), caller, &history.user_id).await?;
        Ok(history)
    }
}
