//! Register Use Case
//!
//! Creates a new user account with one or more non-administrative roles.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    role_name::RoleName,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct RegisterInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: UserId,
    pub username: String,
    pub roles: Vec<RoleName>,
}

pub struct RegisterUseCase<U, R>
where
    U: UserRepository,
    R: RoleRepository,
{
    user_repo: Arc<U>,
    role_repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> RegisterUseCase<U, R>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let (Some(username), Some(password), Some(email), Some(first_name), Some(last_name)) = (
            non_blank(input.username),
            input.password.filter(|p| !p.is_empty()),
            non_blank(input.email),
            non_blank(input.first_name),
            non_blank(input.last_name),
        ) else {
            return Err(AuthError::Validation("All fields are required".to_string()));
        };

        let username = UserName::new(&username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&email)?;
        let raw_password = RawPassword::new(password)?;
        let requested_roles = requested_role_names(input.roles)?;

        if self.user_repo.exists_by_user_name(&username).await? {
            return Err(AuthError::UserNameTaken);
        }

        if requested_roles.iter().any(RoleName::is_admin) {
            return Err(AuthError::AdminRoleNotAllowed);
        }

        let roles = self.role_repo.find_roles_by_names(&requested_roles).await?;
        if let Some(missing) = requested_roles
            .iter()
            .find(|name| !roles.iter().any(|role| &role.name == *name))
        {
            return Err(AuthError::UnknownRole(missing.to_string()));
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;
        let role_ids = requested_roles
            .iter()
            .filter_map(|name| roles.iter().find(|role| &role.name == name))
            .map(|role| role.role_id)
            .collect();

        let user = User::new(
            username,
            email,
            first_name,
            last_name,
            password_hash,
            role_ids,
        );
        self.user_repo.create_user(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            roles = ?requested_roles,
            "User registered"
        );

        Ok(RegisterOutput {
            user_id: user.user_id,
            username: user.username.to_string(),
            roles: requested_roles,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Missing or empty means Listener. Duplicates collapse, first occurrence wins.
fn requested_role_names(roles: Option<Vec<String>>) -> AuthResult<Vec<RoleName>> {
    let mut names: Vec<RoleName> = Vec::new();
    for raw in roles.unwrap_or_default() {
        let name = RoleName::new(&raw).map_err(|_| AuthError::UnknownRole(raw.clone()))?;
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        names.push(RoleName::listener());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_roles_default_to_listener() {
        assert_eq!(
            requested_role_names(None).unwrap(),
            vec![RoleName::listener()]
        );
        assert_eq!(
            requested_role_names(Some(vec![])).unwrap(),
            vec![RoleName::listener()]
        );
    }

    #[test]
    fn test_duplicate_roles_collapse() {
        let names = requested_role_names(strings(&["Artist", "Listener", "Artist"])).unwrap();
        assert_eq!(names, vec![RoleName::artist(), RoleName::listener()]);
    }

    #[test]
    fn test_malformed_role_is_unknown() {
        assert!(matches!(
            requested_role_names(strings(&["not a role"])),
            Err(AuthError::UnknownRole(name)) if name == "not a role"
        ));
    }
}
