//! Caller identity and ownership checks

use auth::{AuthenticatedUser, RoleName};
use kernel::id::UserId;

use crate::domain::repository::UserDirectory;
use crate::error::{CatalogError, CatalogResult};

/// Roles allowed to add catalog content
pub const CREATORS: &[&str] = &[RoleName::ADMIN, RoleName::ARTIST];

/// The caller's user id. A valid token for a deleted account is refused.
pub async fn caller_id<R>(repo: &R, caller: &AuthenticatedUser) -> CatalogResult<UserId>
where
    R: UserDirectory,
{
    repo.user_id_by_name(&caller.username)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %caller.username, "Token for unknown user");
            CatalogError::Forbidden
        })
}

/// Passes for admins and for the user owning the resource
pub async fn require_owner_or_admin<R>(
    repo: &R,
    caller: &AuthenticatedUser,
    owner: &UserId,
) -> CatalogResult<()>
where
    R: UserDirectory,
{
    if caller.is_admin() {
        return Ok(());
    }
    if &caller_id(repo, caller).await? == owner {
        Ok(())
    } else {
        tracing::warn!(
            username = %caller.username,
            owner = %owner,
            "Caller does not own the resource"
        );
        Err(CatalogError::Forbidden)
    }
}
