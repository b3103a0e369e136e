//! Login Use Case
//!
//! Verifies credentials, issues an access token and a refresh token, and
//! stores the refresh token as the user's single active one.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::roles::resolve_role_names;
use crate::application::tokens::{TokenIssuer, refresh_token_digest};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{
    role_name::RoleName, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginOutput {
    pub access_token: String,
    /// Goes into the refresh cookie, never into the body
    pub refresh_token: String,
    pub roles: Vec<RoleName>,
}

pub struct LoginUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> LoginUseCase<U, R>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        if input.username.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        // a name that cannot exist cannot be found
        let username = UserName::new(&input.username).map_err(|_| AuthError::UserNotFound)?;
        let user = self
            .user_repo
            .find_user_by_name(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let raw_password = RawPassword::for_verification(input.password);
        if !user
            .password_hash
            .verify(&raw_password, self.config.pepper())
        {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() {
            return Err(AuthError::AccountSuspended);
        }

        let roles = resolve_role_names(self.role_repo.as_ref(), &user.role_ids).await?;

        let issuer = TokenIssuer::new(&self.config);
        let access_token = issuer.issue_access(user.username.as_str(), &roles)?;
        let refresh_token = issuer.issue_refresh(user.username.as_str())?;

        self.user_repo
            .set_refresh_token(&user.user_id, Some(&refresh_token_digest(&refresh_token)))
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            "User logged in"
        );

        Ok(LoginOutput {
            access_token,
            refresh_token,
            roles,
        })
    }
}
