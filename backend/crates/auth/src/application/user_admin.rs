//! User administration
//!
//! Listing is Admin only. Reading, editing and deleting a single account is
//! allowed for the account owner or an Admin.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::principal::AuthenticatedUser;
use crate::domain::entity::user::{ProfileChanges, User};
use crate::domain::repository::{UserContentCleanup, UserRepository};
use crate::domain::value_object::{email::Email, role_name::RoleName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
pub struct ProfileInput {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct UserAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn list(&self, caller: &AuthenticatedUser) -> AuthResult<Vec<User>> {
        caller.require_any(&[RoleName::ADMIN])?;
        self.user_repo.list_users().await
    }

    pub async fn get(&self, caller: &AuthenticatedUser, user_id: &UserId) -> AuthResult<User> {
        let user = self.find(user_id).await?;
        caller.require_self_or_admin(&user.username)?;
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        caller: &AuthenticatedUser,
        user_id: &UserId,
        input: ProfileInput,
    ) -> AuthResult<User> {
        let mut user = self.find(user_id).await?;
        caller.require_self_or_admin(&user.username)?;

        let changes = ProfileChanges {
            email: input.email.map(Email::new).transpose()?,
            first_name: required_if_present(input.first_name, "First name")?,
            last_name: required_if_present(input.last_name, "Last name")?,
        };
        user.apply_profile(changes);
        self.user_repo.update_profile(&user).await?;

        tracing::info!(user_id = %user.user_id, by = %caller.username, "User profile updated");
        Ok(user)
    }

    /// `cleanup` runs once the caller is authorized, before the account goes
    pub async fn delete<C>(
        &self,
        caller: &AuthenticatedUser,
        user_id: &UserId,
        cleanup: &C,
    ) -> AuthResult<()>
    where
        C: UserContentCleanup,
    {
        let user = self.find(user_id).await?;
        caller.require_self_or_admin(&user.username)?;

        cleanup.remove_user_content(user_id).await?;
        if !self.user_repo.delete_user(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, by = %caller.username, "User deleted");
        Ok(())
    }

    async fn find(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// An absent field is left alone, a present one may not be blank
fn required_if_present(value: Option<String>, field: &str) -> AuthResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AuthError::Validation(format!("{field} cannot be empty"))),
        other => Ok(other),
    }
}
