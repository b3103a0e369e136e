//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::{RoleId, UserId};

use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword, user_status::UserStatus,
};

/// User account
///
/// `refresh_token_hash` holds the SHA-256 digest of the single active
/// refresh token, never the token itself.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: UserName,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: UserPassword,
    pub status: UserStatus,
    pub role_ids: Vec<RoleId>,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a user (or an admin) may change
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    pub fn new(
        username: UserName,
        email: Email,
        first_name: String,
        last_name: String,
        password_hash: UserPassword,
        role_ids: Vec<RoleId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            username,
            email,
            first_name,
            last_name,
            password_hash,
            status: UserStatus::default(),
            role_ids,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    pub fn apply_profile(&mut self, changes: ProfileChanges) {
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        self.updated_at = Utc::now();
    }

    /// Add a role without duplicating it
    pub fn grant_role(&mut self, role_id: RoleId) -> bool {
        if self.role_ids.contains(&role_id) {
            return false;
        }
        self.role_ids.push(role_id);
        self.updated_at = Utc::now();
        true
    }

    pub fn revoke_role(&mut self, role_id: &RoleId) {
        self.role_ids.retain(|id| id != role_id);
        self.updated_at = Utc::now();
    }
}
