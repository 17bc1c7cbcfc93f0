//! Value objects - immutable types that represent domain concepts

mod permissions;
mod role;
pub mod text;

pub use permissions::{has_all_permissions, has_any_permission, has_permission, Permissions};
pub use role::{Role, RoleParseError};
