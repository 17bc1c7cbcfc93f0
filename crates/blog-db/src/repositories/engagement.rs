//! PostgreSQL implementation of EngagementRepository
//!
//! Every toggle and view runs in one transaction that first locks the target
//! row, so the join table and the denormalized counter never drift under
//! concurrent requests.

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use blog_core::entities::{
    CommentCounters, EngagementKind, Post, PostCounters, PostView, ToggleOutcome, ViewOutcome,
};
use blog_core::traits::{EngagementRepository, RepoResult};

use crate::models::PostModel;

use super::error::{comment_not_found, map_db_error, post_not_found};

/// Tables and columns behind one engagement kind
#[derive(Debug, Clone, Copy)]
struct ToggleTables {
    join_table: &'static str,
    target_column: &'static str,
    target_table: &'static str,
    counter_column: &'static str,
}

impl ToggleTables {
    const fn for_kind(kind: EngagementKind) -> Self {
        match kind {
            EngagementKind::PostLike => Self {
                join_table: "post_likes",
                target_column: "post_id",
                target_table: "posts",
                counter_column: "likes_count",
            },
            EngagementKind::CommentLike => Self {
                join_table: "comment_likes",
                target_column: "comment_id",
                target_table: "comments",
                counter_column: "likes_count",
            },
            EngagementKind::PostBookmark => Self {
                join_table: "post_bookmarks",
                target_column: "post_id",
                target_table: "posts",
                counter_column: "bookmarks_count",
            },
        }
    }
}

fn target_not_found(kind: EngagementKind, id: Uuid) -> blog_core::DomainError {
    if kind.targets_post() {
        post_not_found(id)
    } else {
        comment_not_found(id)
    }
}

/// PostgreSQL implementation of EngagementRepository
#[derive(Clone)]
pub struct PgEngagementRepository {
    pool: PgPool,
}

impl PgEngagementRepository {
    /// Create a new PgEngagementRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementRepository for PgEngagementRepository {
    #[instrument(skip(self))]
    async fn toggle(
        &self,
        kind: EngagementKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<ToggleOutcome> {
        let t = ToggleTables::for_kind(kind);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let locked = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            t.counter_column, t.target_table
        ))
        .bind(target_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if locked.is_none() {
            return Err(target_not_found(kind, target_id));
        }

        let removed = sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
            t.join_table, t.target_column
        ))
        .bind(target_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected()
            > 0;

        let count = if removed {
            sqlx::query_scalar::<_, i64>(&format!(
                "UPDATE {table} SET {col} = GREATEST({col} - 1, 0) WHERE id = $1 RETURNING {col}",
                table = t.target_table,
                col = t.counter_column
            ))
            .bind(target_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?
        } else {
            sqlx::query(&format!(
                "INSERT INTO {} ({}, user_id) VALUES ($1, $2)",
                t.join_table, t.target_column
            ))
            .bind(target_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            sqlx::query_scalar::<_, i64>(&format!(
                "UPDATE {table} SET {col} = {col} + 1 WHERE id = $1 RETURNING {col}",
                table = t.target_table,
                col = t.counter_column
            ))
            .bind(target_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?
        };

        tx.commit().await.map_err(map_db_error)?;

        debug!(kind = kind.as_str(), active = !removed, count, "Engagement toggled");

        Ok(ToggleOutcome {
            active: !removed,
            count,
        })
    }

    #[instrument(skip(self))]
    async fn is_active(
        &self,
        kind: EngagementKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<bool> {
        let t = ToggleTables::for_kind(kind);

        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND user_id = $2)",
            t.join_table, t.target_column
        ))
        .bind(target_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, view), fields(post_id = %view.post_id))]
    async fn record_view(&self, view: PostView, window: Duration) -> RepoResult<ViewOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let current = sqlx::query_scalar::<_, i64>(
            "SELECT views_count FROM posts WHERE id = $1 FOR UPDATE",
        )
        .bind(view.post_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| post_not_found(view.post_id))?;

        // Signed-in viewers dedup by user id, anonymous ones by IP among
        // other anonymous rows
        let seen_recently = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM post_views
                WHERE post_id = $1
                  AND counted
                  AND viewed_at > $2
                  AND CASE
                        WHEN $3::UUID IS NULL THEN anonymous AND ip_address = $4
                        ELSE user_id = $3
                      END
            )
            ",
        )
        .bind(view.post_id)
        .bind(view.viewed_at - window)
        .bind(view.user_id)
        .bind(&view.ip_address)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let counted = !seen_recently;

        sqlx::query(
            r"
            INSERT INTO post_views (id, post_id, user_id, ip_address, viewed_at, counted, anonymous)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(view.id)
        .bind(view.post_id)
        .bind(view.user_id)
        .bind(&view.ip_address)
        .bind(view.viewed_at)
        .bind(counted)
        .bind(view.anonymous)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let views_count = if counted {
            sqlx::query_scalar::<_, i64>(
                "UPDATE posts SET views_count = views_count + 1 WHERE id = $1 RETURNING views_count",
            )
            .bind(view.post_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?
        } else {
            current
        };

        tx.commit().await.map_err(map_db_error)?;

        Ok(ViewOutcome {
            counted,
            views_count,
        })
    }

    #[instrument(skip(self))]
    async fn bookmarked_posts(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Post>> {
        let results = sqlx::query_as::<_, PostModel>(
            r"
            SELECT p.id, p.author_id, p.status, p.title, p.slug, p.content, p.excerpt, p.tags,
                   p.category, p.views_count, p.likes_count, p.bookmarks_count,
                   p.reading_time_minutes, p.published_at, p.created_at, p.updated_at
            FROM post_bookmarks b
            JOIN posts p ON p.id = b.post_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn recount_post(&self, post_id: Uuid) -> RepoResult<PostCounters> {
        let row = sqlx::query_as::<_, (i64, i64, i64)>(
            r"
            UPDATE posts p
            SET views_count = (SELECT COUNT(*) FROM post_views v WHERE v.post_id = p.id AND v.counted),
                likes_count = (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id),
                bookmarks_count = (SELECT COUNT(*) FROM post_bookmarks b WHERE b.post_id = p.id)
            WHERE p.id = $1
            RETURNING p.views_count, p.likes_count, p.bookmarks_count
            ",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| post_not_found(post_id))?;

        Ok(PostCounters {
            views_count: row.0,
            likes_count: row.1,
            bookmarks_count: row.2,
        })
    }

    #[instrument(skip(self))]
    async fn recount_comment(&self, comment_id: Uuid) -> RepoResult<CommentCounters> {
        // Reporting is monotonic, so is_reported is never cleared here
        let row = sqlx::query_as::<_, (i64, i64)>(
            r"
            UPDATE comments c
            SET likes_count = (SELECT COUNT(*) FROM comment_likes l WHERE l.comment_id = c.id),
                report_count = (SELECT COUNT(*) FROM comment_reports r WHERE r.comment_id = c.id),
                is_reported = c.is_reported
                    OR EXISTS(SELECT 1 FROM comment_reports r WHERE r.comment_id = c.id)
            WHERE c.id = $1
            RETURNING c.likes_count, c.report_count
            ",
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| comment_not_found(comment_id))?;

        Ok(CommentCounters {
            likes_count: row.0,
            report_count: row.1,
        })
    }
}
