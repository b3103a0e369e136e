//! Role Entity

use kernel::id::RoleId;

use crate::domain::value_object::role_name::RoleName;

/// A named permission tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub role_id: RoleId,
    pub name: RoleName,
    /// Higher means more privileged. Listener=1, Artist=2, Admin=3.
    pub clearance_level: i16,
}

impl Role {
    pub fn new(name: RoleName, clearance_level: Option<i16>) -> Self {
        let clearance_level = clearance_level.unwrap_or_else(|| name.default_clearance());
        Self {
            role_id: RoleId::new(),
            name,
            clearance_level,
        }
    }
}
