//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod analytics;
pub mod comment;
pub mod context;
pub mod engagement;
pub mod error;
pub mod guard;
pub mod pagination;
pub mod post;
pub mod user;

// Re-export all services for convenience
pub use analytics::AnalyticsService;
pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use engagement::{EngagementService, LikeTarget};
pub use error::{ServiceError, ServiceResult};
pub use guard::AuthorizationGuard;
pub use pagination::Page;
pub use post::PostService;
pub use user::UserService;
