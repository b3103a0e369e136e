//! Role Name Value Object
//!
//! Role names are matched exactly (case-sensitive), as they appear in
//! access tokens. `Listener`, `Artist` and `Admin` ship with the schema.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ROLE_NAME_MAX_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleNameError {
    Empty,
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char },
    InvalidStart { char: char },
}

impl fmt::Display for RoleNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Role name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "Role name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char } => {
                write!(f, "Invalid character '{char}' in role name")
            }
            Self::InvalidStart { char } => {
                write!(f, "Role name cannot start with '{char}'. Must start with a letter")
            }
        }
    }
}

impl std::error::Error for RoleNameError {}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    pub const LISTENER: &'static str = "Listener";
    pub const ARTIST: &'static str = "Artist";
    pub const ADMIN: &'static str = "Admin";

    pub fn new(input: impl AsRef<str>) -> Result<Self, RoleNameError> {
        let name = input.as_ref().trim();

        let Some(first) = name.chars().next() else {
            return Err(RoleNameError::Empty);
        };
        if !first.is_ascii_alphabetic() {
            return Err(RoleNameError::InvalidStart { char: first });
        }

        let length = name.chars().count();
        if length > ROLE_NAME_MAX_LENGTH {
            return Err(RoleNameError::TooLong {
                length,
                max: ROLE_NAME_MAX_LENGTH,
            });
        }

        if let Some(char) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(RoleNameError::InvalidCharacter { char });
        }

        Ok(Self(name.to_string()))
    }

    pub fn listener() -> Self {
        Self(Self::LISTENER.to_string())
    }

    pub fn artist() -> Self {
        Self(Self::ARTIST.to_string())
    }

    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The administrative role cannot be self-assigned at registration
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default clearance for the built-in roles, 1 for anything else
    pub fn default_clearance(&self) -> i16 {
        match self.0.as_str() {
            Self::ADMIN => 3,
            Self::ARTIST => 2,
            _ => 1,
        }
    }
}

impl fmt::Debug for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleName({})", self.0)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RoleName {
    type Error = RoleNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl PartialEq<str> for RoleName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
