//! User Status Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account status
///
/// - **Normal**: can log in and use every feature
/// - **Suspended**: login and refresh are refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserStatus {
    #[default]
    Normal = 0,
    Suspended = 1,
}

impl UserStatus {
    /// Numeric id for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Suspended => "Suspended",
        }
    }

    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Normal),
            1 => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
