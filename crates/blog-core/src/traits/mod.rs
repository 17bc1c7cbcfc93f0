//! Ports - traits the infrastructure layer implements

mod clock;
mod repositories;

pub use clock::{Clock, SystemClock};
pub use repositories::{
    AnalyticsRepository, CommentRepository, EngagementRepository, ModerationQuery, PostQuery,
    PostRepository, PostSort, RepoResult, UserRepository,
};
