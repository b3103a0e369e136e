//! The authenticated caller, as asserted by a verified access token

use crate::domain::value_object::{role_name::RoleName, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub roles: Vec<RoleName>,
}

impl AuthenticatedUser {
    pub fn new(username: impl Into<String>, roles: Vec<RoleName>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Passes when the caller holds any of `allowed`
    pub fn require_any(&self, allowed: &[&str]) -> AuthResult<()> {
        if allowed.iter().any(|role| self.has_role(role)) {
            Ok(())
        } else {
            tracing::warn!(
                username = %self.username,
                required = ?allowed,
                "Caller lacks a required role"
            );
            Err(AuthError::Forbidden)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::ADMIN)
    }

    /// Usernames compare case-insensitively, like the unique index
    pub fn is(&self, username: &UserName) -> bool {
        self.username.eq_ignore_ascii_case(username.as_str())
    }

    /// Passes for the named user themself or any admin
    pub fn require_self_or_admin(&self, username: &UserName) -> AuthResult<()> {
        if self.is_admin() || self.is(username) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}
