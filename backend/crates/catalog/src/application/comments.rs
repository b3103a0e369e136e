//! Comment use cases

use std::sync::Arc;

use auth::AuthenticatedUser;
use kernel::id::{CommentId, ListedSongId};

use crate::application::access::{caller_id, require_owner_or_admin};
use crate::domain::entity::comment::Comment;
use crate::domain::repository::{CommentRepository, ListingRepository, UserDirectory};
use crate::error::{CatalogError, CatalogResult};

pub struct PostCommentInput {
    pub message: Option<String>,
    pub reply_to: Option<CommentId>,
}

pub struct CommentStateInput {
    /// A blank reason clears the flag
    pub flag: Option<String>,
    /// +1 or -1
    pub vote: Option<i32>,
}

pub struct CommentUseCase<R>
where
    R: CommentRepository + ListingRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> CommentUseCase<R>
where
    R: CommentRepository + ListingRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, listing_id: Option<&ListedSongId>) -> CatalogResult<Vec<Comment>> {
        if let Some(listing_id) = listing_id {
            self.require_listing(listing_id).await?;
        }
        self.repo.list_comments(listing_id).await
    }

    pub async fn get(&self, comment_id: &CommentId) -> CatalogResult<Comment> {
        self.repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Comment", comment_id))
    }

    pub async fn post(
        &self,
        caller: &AuthenticatedUser,
        listing_id: &ListedSongId,
        input: PostCommentInput,
    ) -> CatalogResult<Comment> {
        self.require_listing(listing_id).await?;
        let posted_by = caller_id(self.repo.as_ref(), caller).await?;
        let comment = Comment::new(
            *listing_id,
            posted_by,
            input.message.as_deref().unwrap_or_default(),
            input.reply_to,
        )?;

        if let Some(parent_id) = &input.reply_to {
            let parent = self.get(parent_id).await?;
            if parent.listed_song != *listing_id {
                return Err(CatalogError::validation(
                    "A reply must be on the same listing as its parent",
                ));
            }
        }

        self.repo.insert_comment(&comment).await?;
        tracing::info!(
            comment_id = %comment.comment_id,
            listed_song_id = %listing_id,
            reply = comment.parent.is_some(),
            "Comment posted"
        );
        Ok(comment)
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        comment_id: &CommentId,
        message: Option<String>,
    ) -> CatalogResult<Comment> {
        let comment = self.get(comment_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &comment.posted_by).await?;

        let message = message.unwrap_or_default();
        self.modify(comment_id, |comment| comment.edit(&message)).await
    }

    /// Any authenticated user may flag or vote
    pub async fn update_state(
        &self,
        caller: &AuthenticatedUser,
        comment_id: &CommentId,
        input: CommentStateInput,
    ) -> CatalogResult<Comment> {
        if input.flag.is_none() && input.vote.is_none() {
            return Err(CatalogError::validation("flag or vote is required"));
        }
        if input.vote.is_some_and(|v| v != 1 && v != -1) {
            return Err(CatalogError::validation("vote must be 1 or -1"));
        }

        let flag_changed = input.flag.is_some();
        let comment = self
            .modify(comment_id, |comment| {
                if let Some(reason) = &input.flag {
                    comment.set_flag(reason);
                }
                if let Some(vote) = input.vote {
                    comment.vote(vote);
                }
                Ok(())
            })
            .await?;

        if flag_changed {
            tracing::info!(
                comment_id = %comment_id,
                username = %caller.username,
                flagged = comment.is_flagged(),
                "Comment flag changed"
            );
        }
        Ok(comment)
    }

    /// A deleted reply is also detached from its parent
    pub async fn delete(&self, caller: &AuthenticatedUser, comment_id: &CommentId) -> CatalogResult<()> {
        let comment = self.get(comment_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &comment.posted_by).await?;

        if !self.repo.remove_comment(comment_id).await? {
            return Err(CatalogError::not_found("Comment", comment_id));
        }
        tracing::info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    async fn modify<F>(&self, comment_id: &CommentId, change: F) -> CatalogResult<Comment>
    where
        F: FnOnce(&mut Comment) -> CatalogResult<()> + Send,
    {
        self.repo
            .modify_comment(comment_id, change)
            .await?
            .ok_or_else(|| CatalogError::not_found("Comment", comment_id))
    }

    async fn require_listing(&self, listing_id: &ListedSongId) -> CatalogResult<()> {
        match self.repo.find_listing(listing_id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::not_found("Listing", listing_id)),
        }
    }
}
