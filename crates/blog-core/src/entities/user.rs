//! User entity - an account with a role

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{Permissions, Role};

/// User account
///
/// Created as a viewer; only an admin changes the role afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active viewer account
    pub fn new(id: Uuid, email: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name,
            role: Role::Viewer,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Permissions granted by the user's current role
    #[inline]
    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.role)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields an admin may change on an account; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub name: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.is_active.is_none() && self.name.is_none()
    }

    /// Apply the changes in place
    pub fn apply_to(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        user.updated_at = now;
    }
}
