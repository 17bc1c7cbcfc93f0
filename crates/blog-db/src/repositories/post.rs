//! PostgreSQL implementation of PostRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use blog_core::access::PostScope;
use blog_core::entities::{Post, PostChanges, PostStatus};
use blog_core::error::DomainError;
use blog_core::traits::{PostQuery, PostRepository, PostSort, RepoResult};

use crate::models::PostModel;

use super::error::{like_pattern, map_db_error, map_unique_violation, post_not_found};

const POST_COLUMNS: &str = "id, author_id, status, title, slug, content, excerpt, tags, \
     category, views_count, likes_count, bookmarks_count, reading_time_minutes, published_at, \
     created_at, updated_at";

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Re-read a post after a guarded write matched no row and say why
    async fn refused_write(&self, id: Uuid, author_id: Uuid, to: &'static str) -> DomainError {
        match self.find_by_id(id).await {
            Ok(Some(post)) => post
                .check_draft_write(author_id, to)
                .err()
                .unwrap_or_else(|| post_not_found(id)),
            Ok(None) => post_not_found(id),
            Err(e) => e,
        }
    }
}

/// Append the visibility scope as a WHERE predicate
fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: PostScope) {
    let published = PostStatus::Published.as_str();
    let draft = PostStatus::Draft.as_str();

    match scope {
        PostScope::Everything => {
            builder.push("TRUE");
        }
        PostScope::PublishedOnly => {
            builder.push("status = ").push_bind(published);
        }
        PostScope::AllDrafts => {
            builder.push("status = ").push_bind(draft);
        }
        PostScope::DraftsBy(author_id) => {
            builder
                .push("status = ")
                .push_bind(draft)
                .push(" AND author_id = ")
                .push_bind(author_id);
        }
        PostScope::PublishedOrDraftsBy(author_id) => {
            builder
                .push("(status = ")
                .push_bind(published)
                .push(" OR (status = ")
                .push_bind(draft)
                .push(" AND author_id = ")
                .push_bind(author_id)
                .push("))");
        }
        PostScope::Nothing => {
            builder.push("FALSE");
        }
    }
}

/// Append every filter of `query` as AND-ed predicates
fn push_filters<'q>(builder: &mut QueryBuilder<'q, Postgres>, query: &'q PostQuery) {
    builder.push(" WHERE ");
    push_scope(builder, query.scope);

    if let Some(search) = query.search.as_deref() {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(tag) = query.tag.as_deref() {
        builder.push(" AND ").push_bind(tag).push(" = ANY(tags)");
    }
    if let Some(category) = query.category.as_deref() {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(author_id) = query.author_id {
        builder.push(" AND author_id = ").push_bind(author_id);
    }
}

fn order_clause(sort: PostSort) -> &'static str {
    match sort {
        PostSort::Newest => " ORDER BY created_at DESC, id DESC",
        PostSort::Oldest => " ORDER BY created_at ASC, id ASC",
        PostSort::MostViewed => " ORDER BY views_count DESC, created_at DESC, id DESC",
        PostSort::MostLiked => " ORDER BY likes_count DESC, created_at DESC, id DESC",
        PostSort::Title => " ORDER BY title ASC, id ASC",
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: &str, except: Option<Uuid>) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM posts
                WHERE slug = $1 AND ($2::UUID IS NULL OR id <> $2)
            )
            ",
        )
        .bind(slug)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, post), fields(post_id = %post.id, slug = %post.slug))]
    async fn create(&self, post: &Post) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO posts (id, author_id, status, title, slug, content, excerpt, tags,
                               category, views_count, likes_count, bookmarks_count,
                               reading_time_minutes, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(post.status.as_str())
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.tags)
        .bind(&post.category)
        .bind(post.views_count)
        .bind(post.likes_count)
        .bind(post.bookmarks_count)
        .bind(post.reading_time_minutes)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::SlugAlreadyExists(post.slug.clone()))
        })?;

        Ok(())
    }

    #[instrument(skip(self, changes), fields(fields = ?changes.changed_fields()))]
    async fn update_draft(
        &self,
        id: Uuid,
        author_id: Uuid,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> RepoResult<Post> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE posts SET updated_at = ");
        builder.push_bind(now);

        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title.as_str());
        }
        if let Some(slug) = &changes.slug {
            builder.push(", slug = ").push_bind(slug.as_str());
        }
        if let Some(content) = &changes.content {
            builder.push(", content = ").push_bind(content.as_str());
        }
        if let Some(excerpt) = &changes.excerpt {
            builder.push(", excerpt = ").push_bind(excerpt.as_str());
        }
        if let Some(tags) = &changes.tags {
            builder.push(", tags = ").push_bind(tags.clone());
        }
        if let Some(category) = &changes.category {
            builder.push(", category = ").push_bind(category.as_str());
        }
        if let Some(status) = changes.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        if let Some(minutes) = changes.reading_time_minutes {
            builder.push(", reading_time_minutes = ").push_bind(minutes);
        }
        if let Some(at) = changes.published_at {
            builder.push(", published_at = ").push_bind(at);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND author_id = ")
            .push_bind(author_id)
            .push(" AND status = ")
            .push_bind(PostStatus::Draft.as_str())
            .push(" RETURNING ")
            .push(POST_COLUMNS);

        let result = builder
            .build_query_as::<PostModel>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let slug = changes.slug.clone().unwrap_or_default();
                map_unique_violation(e, || DomainError::SlugAlreadyExists(slug))
            })?;

        match result {
            Some(model) => Ok(Post::from(model)),
            None => {
                let to = changes.status.unwrap_or(PostStatus::Draft).as_str();
                Err(self.refused_write(id, author_id, to).await)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_draft(&self, id: Uuid, author_id: Uuid) -> RepoResult<()> {
        let result =
            sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2 AND status = $3")
                .bind(id)
                .bind(author_id)
                .bind(PostStatus::Draft.as_str())
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(self.refused_write(id, author_id, "deleted").await);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &PostQuery) -> RepoResult<Vec<Post>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        builder.push(POST_COLUMNS).push(" FROM posts");
        push_filters(&mut builder, query);
        builder
            .push(order_clause(query.sort))
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let results = builder
            .build_query_as::<PostModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, query: &PostQuery) -> RepoResult<i64> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM posts");
        push_filters(&mut builder, query);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
