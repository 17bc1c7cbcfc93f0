//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in blog-core.
//! Each repository handles database operations for a specific domain entity.

mod analytics;
mod comment;
mod engagement;
mod error;
mod post;
mod user;

pub use analytics::PgAnalyticsRepository;
pub use comment::PgCommentRepository;
pub use engagement::PgEngagementRepository;
pub use post::PgPostRepository;
pub use user::PgUserRepository;
