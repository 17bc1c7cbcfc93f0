//! PostgreSQL implementation of AnalyticsRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use blog_core::entities::ContentStats;
use blog_core::traits::{AnalyticsRepository, RepoResult};

use crate::models::ContentStatsModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AnalyticsRepository
#[derive(Clone)]
pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    /// Create a new PgAnalyticsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    #[instrument(skip(self))]
    async fn content_stats(&self) -> RepoResult<ContentStats> {
        // SUM over BIGINT yields NUMERIC; cast back so it decodes as i64
        let row = sqlx::query_as::<_, ContentStatsModel>(
            r"
            SELECT
                (SELECT COUNT(*) FROM posts) AS total_posts,
                (SELECT COUNT(*) FROM posts WHERE status = 'published') AS published_posts,
                (SELECT COUNT(*) FROM posts WHERE status = 'draft') AS draft_posts,
                (SELECT COALESCE(SUM(views_count), 0)::BIGINT FROM posts) AS total_views,
                (SELECT COALESCE(SUM(likes_count), 0)::BIGINT FROM posts) AS total_likes,
                (SELECT COUNT(*) FROM comments) AS total_comments,
                (SELECT COUNT(*) FROM comments WHERE is_reported) AS reported_comments,
                (SELECT COUNT(*) FROM comments WHERE is_hidden) AS hidden_comments
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ContentStats::from(row))
    }
}
