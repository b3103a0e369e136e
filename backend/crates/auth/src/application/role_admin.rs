//! Role administration
//!
//! Reads are public. Every mutation requires the Admin role.

use std::sync::Arc;

use kernel::error::app_error::AppError;
use kernel::id::{RoleId, UserId};

use crate::application::principal::AuthenticatedUser;
use crate::domain::entity::role::Role;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};

pub struct RoleInput {
    pub name: Option<String>,
    pub clearance_level: Option<i16>,
}

pub struct RoleAdminUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
}

impl<U, R> RoleAdminUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    pub fn new(user_repo: Arc<U>, role_repo: Arc<R>) -> Self {
        Self {
            user_repo,
            role_repo,
        }
    }

    pub async fn list(&self) -> AuthResult<Vec<Role>> {
        self.role_repo.list_roles().await
    }

    pub async fn get(&self, role_id: &RoleId) -> AuthResult<Role> {
        self.role_repo
            .find_role_by_id(role_id)
            .await?
            .ok_or(AuthError::RoleNotFound)
    }

    pub async fn create(&self, caller: &AuthenticatedUser, input: RoleInput) -> AuthResult<Role> {
        caller.require_any(&[RoleName::ADMIN])?;

        let (name, clearance_level) = validate(input)?;
        if self.role_repo.exists_by_role_name(&name).await? {
            return Err(AuthError::RoleNameTaken);
        }

        let role = Role::new(name, clearance_level);
        self.role_repo.create_role(&role).await?;

        tracing::info!(role_id = %role.role_id, name = %role.name, "Role created");
        Ok(role)
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        role_id: &RoleId,
        input: RoleInput,
    ) -> AuthResult<Role> {
        caller.require_any(&[RoleName::ADMIN])?;

        let mut role = self.get(role_id).await?;
        let (name, clearance_level) = validate(input)?;

        if name != role.name && self.role_repo.exists_by_role_name(&name).await? {
            return Err(AuthError::RoleNameTaken);
        }

        role.clearance_level = clearance_level.unwrap_or(role.clearance_level);
        role.name = name;
        self.role_repo.update_role(&role).await?;

        tracing::info!(role_id = %role.role_id, name = %role.name, "Role updated");
        Ok(role)
    }

    /// Every user must exist; the first unknown id is reported
    pub async fn add_users(
        &self,
        caller: &AuthenticatedUser,
        role_id: &RoleId,
        user_ids: &[UserId],
    ) -> AuthResult<Role> {
        caller.require_any(&[RoleName::ADMIN])?;

        let role = self.get(role_id).await?;
        for user_id in user_ids {
            if self.user_repo.find_user_by_id(user_id).await?.is_none() {
                return Err(AppError::not_found(format!("User {user_id} not found")).into());
            }
        }

        self.role_repo.add_role_to_users(role_id, user_ids).await?;

        tracing::info!(
            role_id = %role.role_id,
            users = user_ids.len(),
            "Role granted to users"
        );
        Ok(role)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, role_id: &RoleId) -> AuthResult<()> {
        caller.require_any(&[RoleName::ADMIN])?;

        if !self.role_repo.delete_role(role_id).await? {
            return Err(AuthError::RoleNotFound);
        }

        tracing::info!(role_id = %role_id, "Role deleted");
        Ok(())
    }
}

fn validate(input: RoleInput) -> AuthResult<(RoleName, Option<i16>)> {
    let raw = input
        .name
        .ok_or_else(|| AuthError::Validation("Role name is required".to_string()))?;
    let name = RoleName::new(&raw).map_err(|e| AuthError::Validation(e.to_string()))?;

    if input.clearance_level.is_some_and(|level| level < 1) {
        return Err(AuthError::Validation(
            "Clearance level must be at least 1".to_string(),
        ));
    }

    Ok((name, input.clearance_level))
}
