//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod post;
mod stats;
mod user;

pub use comment::{CommentModel, CommentReportModel};
pub use post::PostModel;
pub use stats::ContentStatsModel;
pub use user::UserModel;
