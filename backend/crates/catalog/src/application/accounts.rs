//! Account deletion hook
//!
//! `auth` deletes the account row; this removes the catalog content keyed
//! by that account first, so no list keeps an id that no longer resolves.

use std::sync::Arc;

use auth::{AuthError, AuthResult, UserContentCleanup};
use kernel::id::UserId;

use crate::domain::repository::UserDirectory;
use crate::error::CatalogError;

pub struct AccountContentCleanup<R> {
    repo: Arc<R>,
}

impl<R> AccountContentCleanup<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> Clone for AccountContentCleanup<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R> UserContentCleanup for AccountContentCleanup<R>
where
    R: UserDirectory + Send + Sync,
{
    async fn remove_user_content(&self, user_id: &UserId) -> AuthResult<()> {
        self.repo
            .remove_user_content(user_id)
            .await
            .map_err(into_auth_error)?;
        tracing::info!(user_id = %user_id, "Catalog content removed with account");
        Ok(())
    }
}

fn into_auth_error(err: CatalogError) -> AuthError {
    match err {
        CatalogError::Auth(e) => e,
        other => {
            other.log();
            AuthError::App(other.into_app_error())
        }
    }
}
