//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use blog_core::entities::{Comment, CommentReport, HiddenInfo, ModerationFilter};
use blog_core::error::DomainError;
use blog_core::traits::{CommentRepository, ModerationQuery, RepoResult};

use crate::models::{CommentModel, CommentReportModel};

use super::error::{comment_not_found, map_db_error, map_unique_violation};

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// WHERE predicate for a moderation filter
fn moderation_predicate(filter: ModerationFilter) -> &'static str {
    match filter {
        ModerationFilter::Reported => "is_reported AND NOT is_hidden",
        ModerationFilter::Hidden => "is_hidden",
        ModerationFilter::All => "TRUE",
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        let result = sqlx::query_as::<_, CommentModel>(
            r"
            SELECT id, post_id, author_id, content, status, likes_count, report_count,
                   is_reported, is_hidden, hidden_by, hidden_at, hidden_reason, created_at
            FROM comments
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Comment::from))
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id, post_id = %comment.post_id))]
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO comments (id, post_id, author_id, content, status, likes_count,
                                  report_count, is_reported, is_hidden, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.status.as_str())
        .bind(comment.likes_count)
        .bind(comment.report_count)
        .bind(comment.is_reported)
        .bind(comment.is_hidden)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        // Reports and likes go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_post(&self, post_id: Uuid, include_hidden: bool) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(
            r"
            SELECT id, post_id, author_id, content, status, likes_count, report_count,
                   is_reported, is_hidden, hidden_by, hidden_at, hidden_reason, created_at
            FROM comments
            WHERE post_id = $1 AND ($2 OR NOT is_hidden)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(post_id)
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_for_moderation(&self, query: &ModerationQuery) -> RepoResult<Vec<Comment>> {
        let sql = format!(
            r"
            SELECT id, post_id, author_id, content, status, likes_count, report_count,
                   is_reported, is_hidden, hidden_by, hidden_at, hidden_reason, created_at
            FROM comments
            WHERE {}
            ORDER BY (is_reported AND NOT is_hidden) DESC, report_count DESC, created_at DESC
            LIMIT $1 OFFSET $2
            ",
            moderation_predicate(query.filter)
        );

        let results = sqlx::query_as::<_, CommentModel>(&sql)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_for_moderation(&self, filter: ModerationFilter) -> RepoResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM comments WHERE {}",
            moderation_predicate(filter)
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, report), fields(comment_id = %report.comment_id, reporter_id = %report.reporter_id))]
    async fn report(&self, report: &CommentReport) -> RepoResult<Comment> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serialize concurrent reports on the same comment
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM comments WHERE id = $1 FOR UPDATE")
            .bind(report.comment_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if exists.is_none() {
            return Err(comment_not_found(report.comment_id));
        }

        sqlx::query(
            r"
            INSERT INTO comment_reports (id, comment_id, reporter_id, reason, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(report.id)
        .bind(report.comment_id)
        .bind(report.reporter_id)
        .bind(report.reason.as_str())
        .bind(&report.description)
        .bind(report.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateReport))?;

        let updated = sqlx::query_as::<_, CommentModel>(
            r"
            UPDATE comments
            SET report_count = report_count + 1, is_reported = TRUE
            WHERE id = $1
            RETURNING id, post_id, author_id, content, status, likes_count, report_count,
                      is_reported, is_hidden, hidden_by, hidden_at, hidden_reason, created_at
            ",
        )
        .bind(report.comment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Comment::from(updated))
    }

    #[instrument(skip(self))]
    async fn reports_for(&self, comment_id: Uuid) -> RepoResult<Vec<CommentReport>> {
        let results = sqlx::query_as::<_, CommentReportModel>(
            r"
            SELECT id, comment_id, reporter_id, reason, description, created_at
            FROM comment_reports
            WHERE comment_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(comment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(CommentReport::from).collect())
    }

    #[instrument(skip(self, info), fields(moderator_id = %info.hidden_by))]
    async fn hide(&self, id: Uuid, info: &HiddenInfo) -> RepoResult<Comment> {
        let result = sqlx::query_as::<_, CommentModel>(
            r"
            UPDATE comments
            SET is_hidden = TRUE, hidden_by = $2, hidden_at = $3, hidden_reason = $4
            WHERE id = $1
            RETURNING id, post_id, author_id, content, status, likes_count, report_count,
                      is_reported, is_hidden, hidden_by, hidden_at, hidden_reason, created_at
            ",
        )
        .bind(id)
        .bind(info.hidden_by)
        .bind(info.hidden_at)
        .bind(&info.reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Comment::from).ok_or_else(|| comment_not_found(id))
    }

    #[instrument(skip(self))]
    async fn unhide(&self, id: Uuid) -> RepoResult<Comment> {
        let result = sqlx::query_as::<_, CommentModel>(
            r"
            UPDATE comments
            SET is_hidden = FALSE, hidden_by = NULL, hidden_at = NULL, hidden_reason = NULL
            WHERE id = $1
            RETURNING id, post_id, author_id, content, status, likes_count, report_count,
                      is_reported, is_hidden, hidden_by, hidden_at, hidden_reason, created_at
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Comment::from).ok_or_else(|| comment_not_found(id))
    }
}
