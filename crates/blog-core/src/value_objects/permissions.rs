//! Permission bitflags and the role -> permission matrix
//!
//! Defines the 11 blog permissions as a bitfield. Each role is granted an
//! explicitly enumerated set; nothing is inferred from the role hierarchy.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::role::Role;

bitflags! {
    /// Blog permission flags
    ///
    /// Serialized as a list of snake_case names in JSON.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u16 {
        /// Read published posts
        const READ_POSTS        = 1 << 0;
        /// Read drafts written by anyone
        const READ_DRAFTS       = 1 << 1;
        /// Create new posts
        const CREATE_POSTS      = 1 << 2;
        /// Edit posts
        const EDIT_POSTS        = 1 << 3;
        /// Delete posts
        const DELETE_POSTS      = 1 << 4;
        /// Move a post from draft to published
        const PUBLISH_POSTS     = 1 << 5;
        /// Hide and unhide comments, review reports
        const MODERATE_COMMENTS = 1 << 6;
        /// Permanently delete comments
        const DELETE_COMMENTS   = 1 << 7;
        /// Change user roles and account status
        const MANAGE_USERS      = 1 << 8;
        /// Read content statistics
        const VIEW_ANALYTICS    = 1 << 9;
        /// Site-wide maintenance (counter reconciliation)
        const MANAGE_SETTINGS   = 1 << 10;

        /// Permissions that change state somewhere
        const WRITE = Self::CREATE_POSTS.bits()
            | Self::EDIT_POSTS.bits()
            | Self::DELETE_POSTS.bits()
            | Self::PUBLISH_POSTS.bits()
            | Self::MODERATE_COMMENTS.bits()
            | Self::DELETE_COMMENTS.bits()
            | Self::MANAGE_USERS.bits()
            | Self::MANAGE_SETTINGS.bits();
    }
}

/// Name table, in bit order
const NAMES: [(Permissions, &str); 11] = [
    (Permissions::READ_POSTS, "read_posts"),
    (Permissions::READ_DRAFTS, "read_drafts"),
    (Permissions::CREATE_POSTS, "create_posts"),
    (Permissions::EDIT_POSTS, "edit_posts"),
    (Permissions::DELETE_POSTS, "delete_posts"),
    (Permissions::PUBLISH_POSTS, "publish_posts"),
    (Permissions::MODERATE_COMMENTS, "moderate_comments"),
    (Permissions::DELETE_COMMENTS, "delete_comments"),
    (Permissions::MANAGE_USERS, "manage_users"),
    (Permissions::VIEW_ANALYTICS, "view_analytics"),
    (Permissions::MANAGE_SETTINGS, "manage_settings"),
];

const ADMIN: Permissions = Permissions::all();

const EDITOR: Permissions = Permissions::READ_POSTS
    .union(Permissions::READ_DRAFTS)
    .union(Permissions::CREATE_POSTS)
    .union(Permissions::EDIT_POSTS)
    .union(Permissions::DELETE_POSTS)
    .union(Permissions::PUBLISH_POSTS)
    .union(Permissions::MODERATE_COMMENTS)
    .union(Permissions::DELETE_COMMENTS)
    .union(Permissions::VIEW_ANALYTICS);

const AUTHOR: Permissions = Permissions::READ_POSTS
    .union(Permissions::CREATE_POSTS)
    .union(Permissions::EDIT_POSTS)
    .union(Permissions::DELETE_POSTS)
    .union(Permissions::PUBLISH_POSTS);

const VIEWER: Permissions = Permissions::READ_POSTS;

impl Permissions {
    /// The fixed permission set granted to a role
    #[inline]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => ADMIN,
            Role::Editor => EDITOR,
            Role::Author => AUTHOR,
            Role::Viewer => VIEWER,
        }
    }

    /// Permission set for a role given by name; unknown names get nothing
    pub fn for_role_name(name: &str) -> Self {
        name.parse::<Role>()
            .map(Self::for_role)
            .unwrap_or_else(|_| Self::empty())
    }

    /// Check if the permission set contains a required permission
    ///
    /// An empty `permission` is never satisfied.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        !permission.is_empty() && self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        self.intersects(permissions)
    }

    /// Check if the permission set has all of the given permissions
    #[inline]
    pub fn has_all(&self, permissions: Permissions) -> bool {
        self.contains(permissions)
    }

    /// Parse a single permission from its snake_case name
    pub fn from_snake_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(p, _)| *p)
    }

    /// Get a list of all individual permissions that are set
    pub fn list(&self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(p, _)| self.contains(*p))
            .map(|(_, n)| *n)
            .collect()
    }
}

/// Check a single permission for a role
#[inline]
pub fn has_permission(role: Role, permission: Permissions) -> bool {
    Permissions::for_role(role).has(permission)
}

/// True if the role holds at least one permission in the list
pub fn has_any_permission(role: Role, permissions: &[Permissions]) -> bool {
    let granted = Permissions::for_role(role);
    permissions.iter().any(|p| granted.has(*p))
}

/// True if the role holds every permission in the list
///
/// An empty list is trivially satisfied.
pub fn has_all_permissions(role: Role, permissions: &[Permissions]) -> bool {
    let granted = Permissions::for_role(role);
    permissions.iter().all(|p| granted.has(*p))
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.list().join(", "))
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.list())
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(Permissions::empty(), |acc, name| {
            Permissions::from_snake_name(name)
                .map(|p| acc | p)
                .ok_or_else(|| D::Error::custom(format!("unknown permission: {name}")))
        })
    }
}
