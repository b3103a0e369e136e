//! Comment Entity
//!
//! Comments hang off a listed song. A reply records its parent, and the
//! parent keeps the reply ids in `replied_by` with a `replies` count.

use kernel::id::{CommentId, ListedSongId, UserId};
use serde::Serialize;

use super::required_text;
use crate::error::CatalogResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: CommentId,
    pub listed_song: ListedSongId,
    pub posted_by: UserId,
    pub parent: Option<CommentId>,
    pub replied_by: Vec<CommentId>,
    pub message: String,
    /// Empty when not flagged, otherwise the reason
    pub flagged: String,
    pub replies: i32,
    pub votes: i32,
}

impl Comment {
    pub fn new(
        listed_song: ListedSongId,
        posted_by: UserId,
        message: &str,
        parent: Option<CommentId>,
    ) -> CatalogResult<Self> {
        Ok(Self {
            comment_id: CommentId::new(),
            listed_song,
            posted_by,
            parent,
            replied_by: Vec::new(),
            message: required_text("Message", message)?,
            flagged: String::new(),
            replies: 0,
            votes: 0,
        })
    }

    pub fn edit(&mut self, message: &str) -> CatalogResult<()> {
        self.message = required_text("Message", message)?;
        Ok(())
    }

    pub fn attach_reply(&mut self, reply: CommentId) {
        if !self.replied_by.contains(&reply) {
            self.replied_by.push(reply);
            self.replies += 1;
        }
    }

    pub fn detach_reply(&mut self, reply: &CommentId) {
        let before = self.replied_by.len();
        self.replied_by.retain(|id| id != reply);
        if self.replied_by.len() < before {
            self.replies = (self.replies - 1).max(0);
        }
    }

    /// `vote` is +1 or -1
    pub fn vote(&mut self, vote: i32) {
        self.votes = self.votes.saturating_add(vote);
    }

    /// A blank reason clears the flag
    pub fn set_flag(&mut self, reason: &str) {
        self.flagged = reason.trim().to_string();
    }

    pub fn is_flagged(&self) -> bool {
        !self.flagged.is_empty()
    }
}
