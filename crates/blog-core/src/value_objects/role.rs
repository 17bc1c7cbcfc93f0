//! User roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried by every user account
///
/// The level is informational only; permissions come from
/// [`Permissions::for_role`](super::Permissions::for_role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Author,
    #[default]
    Viewer,
}

impl Role {
    /// Hierarchy level: viewer=1 < author=2 < editor=3 < admin=4
    #[inline]
    pub const fn level(self) -> u8 {
        match self {
            Self::Viewer => 1,
            Self::Author => 2,
            Self::Editor => 3,
            Self::Admin => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Author => "author",
            Self::Viewer => "viewer",
        }
    }

    /// Editors and admins see every post regardless of author
    #[inline]
    pub const fn sees_all_posts(self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

/// Error when parsing a role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "author" => Ok(Self::Author),
            "viewer" => Ok(Self::Viewer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
