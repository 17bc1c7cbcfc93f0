//! Domain entities - core business objects

mod comment;
mod engagement;
mod post;
mod user;

pub use comment::{
    moderation_order, Comment, CommentReport, CommentStatus, HiddenInfo, ModerationFilter,
    ReportReason, MAX_COMMENT_LENGTH,
};
pub use engagement::{
    floored_decrement, CommentCounters, ContentStats, EngagementKind, PostCounters, PostView,
    ToggleOutcome, ViewOutcome,
};
pub use post::{Post, PostChanges, PostStatus};
pub use user::{User, UserChanges};
