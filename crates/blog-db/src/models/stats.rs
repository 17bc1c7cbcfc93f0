//! Aggregate row for content statistics

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ContentStatsModel {
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub reported_comments: i64,
    pub hidden_comments: i64,
}
