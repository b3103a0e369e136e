//! Refresh Use Case
//!
//! Exchanges the refresh cookie for a new access token. Role names are
//! re-read, so role changes apply without a new login. The refresh token
//! itself is not rotated.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::application::config::AuthConfig;
use crate::application::roles::resolve_role_names;
use crate::application::tokens::{TokenIssuer, refresh_token_digest};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};

pub struct RefreshOutput {
    pub access_token: String,
    pub roles: Vec<RoleName>,
}

pub struct RefreshUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> RefreshUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(user_repo: Arc<U>, role_repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            role_repo,
            config,
        }
    }

    /// `refresh_token` is the raw cookie value, `None` when absent
    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<RefreshOutput> {
        let token = refresh_token.ok_or(AuthError::RefreshTokenMissing)?;
        let digest = refresh_token_digest(token);

        let user = self
            .user_repo
            .find_user_by_refresh_token(&digest)
            .await?
            .ok_or(AuthError::RefreshTokenRejected)?;

        let claims = TokenIssuer::new(&self.config).verify_refresh(token)?;
        if !constant_time_eq(
            claims.sub.as_bytes(),
            user.username.as_str().as_bytes(),
        ) {
            tracing::warn!(
                user_id = %user.user_id,
                "Refresh token subject does not match its owner"
            );
            return Err(AuthError::RefreshTokenRejected);
        }

        if !user.can_login() {
            return Err(AuthError::AccountSuspended);
        }

        let roles = resolve_role_names(self.role_repo.as_ref(), &user.role_ids).await?;
        let access_token =
            TokenIssuer::new(&self.config).issue_access(user.username.as_str(), &roles)?;

        tracing::info!(username = %user.username, "Access token refreshed");

        Ok(RefreshOutput {
            access_token,
            roles,
        })
    }
}
