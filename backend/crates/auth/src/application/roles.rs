//! Role name resolution shared by login, refresh and the access middleware

use kernel::id::RoleId;

use crate::domain::repository::RoleRepository;
use crate::domain::value_object::role_name::RoleName;
use crate::error::AuthResult;

/// Current names for `role_ids`, in the user's own order. Ids whose role
/// has since been deleted are skipped.
pub async fn resolve_role_names<R>(role_repo: &R, role_ids: &[RoleId]) -> AuthResult<Vec<RoleName>>
where
    R: RoleRepository,
{
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let roles = role_repo.find_roles_by_ids(role_ids).await?;
    Ok(role_ids
        .iter()
        .filter_map(|id| roles.iter().find(|role| &role.role_id == id))
        .map(|role| role.name.clone())
        .collect())
}
