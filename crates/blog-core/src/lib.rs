//! # blog-core
//!
//! Domain layer containing entities, value objects, access rules, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod access;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use access::{Decision, DenyReason, Identity, PostFilter, PostScope, Principal};
pub use entities::{
    Comment, CommentReport, ContentStats, EngagementKind, ModerationFilter, Post, PostChanges,
    PostStatus, PostView, ReportReason, ToggleOutcome, User, UserChanges, ViewOutcome,
};
pub use error::DomainError;
pub use traits::{
    AnalyticsRepository, Clock, CommentRepository, EngagementRepository, ModerationQuery,
    PostQuery, PostRepository, PostSort, RepoResult, SystemClock, UserRepository,
};
pub use value_objects::{Permissions, Role, RoleParseError};
