//! Logout Use Case
//!
//! Clears the server-side refresh token. The handler clears the cookie in
//! every outcome except a missing cookie.

use std::sync::Arc;

use crate::application::tokens::refresh_token_digest;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct LogoutUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> LogoutUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<()> {
        let token = refresh_token.ok_or(AuthError::RefreshTokenMissing)?;

        let user = self
            .user_repo
            .find_user_by_refresh_token(&refresh_token_digest(token))
            .await?
            .ok_or(AuthError::RefreshTokenRejected)?;

        self.user_repo.set_refresh_token(&user.user_id, None).await?;

        tracing::info!(username = %user.username, "User logged out");
        Ok(())
    }
}
