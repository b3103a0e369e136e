//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{RoleId, UserId};

use crate::domain::entity::{role::Role, user::User};
use crate::domain::value_object::{role_name::RoleName, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create_user(&self, user: &User) -> AuthResult<()>;

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Case-insensitive lookup on the canonical form
    async fn find_user_by_name(&self, username: &UserName) -> AuthResult<Option<User>>;

    async fn exists_by_user_name(&self, username: &UserName) -> AuthResult<bool>;

    /// Find the user whose stored refresh-token digest equals `token_hash`
    async fn find_user_by_refresh_token(&self, token_hash: &str) -> AuthResult<Option<User>>;

    /// Overwrite (or clear, with `None`) the single active refresh token
    async fn set_refresh_token(&self, user_id: &UserId, token_hash: Option<&str>)
    -> AuthResult<()>;

    async fn list_users(&self) -> AuthResult<Vec<User>>;

    /// Persist email, first name and last name
    async fn update_profile(&self, user: &User) -> AuthResult<()>;

    /// Returns false when no row was deleted
    async fn delete_user(&self, user_id: &UserId) -> AuthResult<bool>;
}

/// Role repository trait
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    async fn list_roles(&self) -> AuthResult<Vec<Role>>;

    async fn find_role_by_id(&self, role_id: &RoleId) -> AuthResult<Option<Role>>;

    /// Roles matching any of `names`. Unknown names are simply absent.
    async fn find_roles_by_names(&self, names: &[RoleName]) -> AuthResult<Vec<Role>>;

    /// Roles matching any of `role_ids`, for resolving a user's role names
    async fn find_roles_by_ids(&self, role_ids: &[RoleId]) -> AuthResult<Vec<Role>>;

    async fn exists_by_role_name(&self, name: &RoleName) -> AuthResult<bool>;

    async fn create_role(&self, role: &Role) -> AuthResult<()>;

    async fn update_role(&self, role: &Role) -> AuthResult<()>;

    /// Delete the role and strip it from every user holding it
    async fn delete_role(&self, role_id: &RoleId) -> AuthResult<bool>;

    /// Grant the role to each user that does not already hold it
    async fn add_role_to_users(&self, role_id: &RoleId, user_ids: &[UserId]) -> AuthResult<()>;
}

/// Removes what other modules keep for an account. Runs before the
/// account row is deleted, so a failure leaves the account in place.
#[trait_variant::make(UserContentCleanup: Send)]
pub trait LocalUserContentCleanup {
    async fn remove_user_content(&self, user_id: &UserId) -> AuthResult<()>;
}

/// Nothing outside `auth` references accounts
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUserContent;

impl UserContentCleanup for NoUserContent {
    async fn remove_user_content(&self, _user_id: &UserId) -> AuthResult<()> {
        Ok(())
    }
}
