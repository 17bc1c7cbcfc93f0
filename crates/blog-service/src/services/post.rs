//! Post service
//!
//! Handles post creation, listing, reading, and draft edits/deletion.

use blog_core::access::{
    can_read_post, check_permission, check_post_mutation, Identity, PostScope,
};
use blog_core::entities::{Post, PostChanges, PostStatus};
use blog_core::traits::PostQuery;
use blog_core::value_objects::text;
use blog_core::Permissions;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    CreatePostRequest, ListPostsQuery, PaginatedResponse, PostResponse, UpdatePostRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guard::AuthorizationGuard;
use super::pagination::Page;

/// Post service
pub struct PostService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostService<'a> {
    /// Create a new PostService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn guard(&self) -> AuthorizationGuard<'a> {
        AuthorizationGuard::new(self.ctx)
    }

    /// Create a post authored by the caller
    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        identity: Option<Identity>,
        request: CreatePostRequest,
    ) -> ServiceResult<PostResponse> {
        let guard = self.guard();
        let principal = guard.require(identity, Permissions::CREATE_POSTS).await?;
        request.validate()?;

        let status = parse_status(request.status.as_deref())?.unwrap_or_default();
        if status == PostStatus::Published {
            guard.enforce(
                &principal,
                check_permission(&principal, Permissions::PUBLISH_POSTS),
                "publish_post",
            )?;
        }

        let slug = match request.slug.as_deref() {
            Some(slug) => checked_slug(slug)?,
            None => slug_from_title(&request.title)?,
        };
        self.ensure_slug_free(&slug, None).await?;

        let now = self.ctx.now();
        let policy = self.ctx.policy();
        let excerpt = request
            .excerpt
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| text::excerpt(&request.content, policy.excerpt_length));

        let post = Post {
            id: Uuid::new_v4(),
            author_id: principal.id,
            status,
            reading_time_minutes: text::reading_time_minutes(
                &request.content,
                policy.reading_words_per_minute as usize,
            ),
            title: request.title,
            slug,
            content: request.content,
            excerpt,
            tags: normalize_tags(request.tags),
            category: request.category,
            views_count: 0,
            likes_count: 0,
            bookmarks_count: 0,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };

        self.ctx.post_repo().create(&post).await?;

        info!(
            post_id = %post.id,
            author_id = %post.author_id,
            slug = %post.slug,
            status = %post.status,
            "Post created"
        );

        Ok(PostResponse::from(post))
    }

    /// List posts visible to the caller
    #[instrument(skip(self, query))]
    pub async fn list_posts(
        &self,
        identity: Option<Identity>,
        query: ListPostsQuery,
    ) -> ServiceResult<PaginatedResponse<PostResponse>> {
        query.validate()?;
        let viewer = self.guard().principal(identity).await?;

        let scope = PostScope::resolve(viewer.as_ref(), query.filter);
        let page = Page::resolve(self.ctx.policy(), &query.page);

        let mut post_query = PostQuery::new(scope);
        post_query.search = query.search.filter(|s| !s.trim().is_empty());
        post_query.tag = query.tag;
        post_query.category = query.category;
        post_query.author_id = query.author_id;
        post_query.sort = query.sort;
        post_query.limit = page.limit();
        post_query.offset = page.offset();

        let total = self.ctx.post_repo().count(&post_query).await?;
        let posts = self.ctx.post_repo().list(&post_query).await?;

        debug!(?scope, total, returned = posts.len(), "Posts listed");

        Ok(PaginatedResponse::new(posts, page.page, page.per_page, total)
            .map(PostResponse::from))
    }

    /// Read one post by slug
    ///
    /// Drafts the caller may not read are reported as missing.
    #[instrument(skip(self))]
    pub async fn get_post_by_slug(
        &self,
        identity: Option<Identity>,
        slug: &str,
    ) -> ServiceResult<PostResponse> {
        let viewer = self.guard().principal(identity).await?;

        let post = self
            .ctx
            .post_repo()
            .find_by_slug(slug)
            .await?
            .filter(|post| can_read_post(viewer.as_ref(), post))
            .ok_or_else(|| ServiceError::not_found("Post", slug))?;

        Ok(PostResponse::from(post))
    }

    /// Edit the caller's own draft
    ///
    /// All changed fields, including a regenerated slug and the recomputed
    /// reading time and excerpt, are written in one update.
    #[instrument(skip(self, request))]
    pub async fn update_draft_post(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
        request: UpdatePostRequest,
    ) -> ServiceResult<PostResponse> {
        let guard = self.guard();
        let principal = guard.require(identity, Permissions::EDIT_POSTS).await?;
        request.validate()?;

        let post = self.find_post(post_id).await?;
        guard.enforce(
            &principal,
            check_post_mutation(&principal, &post, Permissions::EDIT_POSTS),
            "edit_post",
        )?;

        let policy = self.ctx.policy();
        let mut changes = PostChanges::default();

        if let Some(title) = request.title.filter(|t| *t != post.title) {
            if request.slug.is_none() {
                changes.slug = Some(slug_from_title(&title)?);
            }
            changes.title = Some(title);
        }
        if let Some(slug) = request.slug.as_deref() {
            changes.slug = Some(checked_slug(slug)?);
        }
        if changes.slug.as_deref() == Some(post.slug.as_str()) {
            changes.slug = None;
        }
        if let Some(slug) = changes.slug.as_deref() {
            self.ensure_slug_free(slug, Some(post.id)).await?;
        }

        let explicit_excerpt = request.excerpt.filter(|e| !e.trim().is_empty());
        if let Some(content) = request.content.filter(|c| *c != post.content) {
            changes.reading_time_minutes = Some(text::reading_time_minutes(
                &content,
                policy.reading_words_per_minute as usize,
            ));
            if explicit_excerpt.is_none() {
                changes.excerpt = Some(text::excerpt(&content, policy.excerpt_length));
            }
            changes.content = Some(content);
        }
        if explicit_excerpt.is_some() {
            changes.excerpt = explicit_excerpt;
        }

        if let Some(tags) = request.tags {
            changes.tags = Some(normalize_tags(tags));
        }
        if let Some(category) = request.category {
            changes.category = Some(category);
        }

        let now = self.ctx.now();
        if parse_status(request.status.as_deref())? == Some(PostStatus::Published) {
            guard.enforce(
                &principal,
                check_permission(&principal, Permissions::PUBLISH_POSTS),
                "publish_post",
            )?;
            changes.status = Some(PostStatus::Published);
            changes.published_at = Some(now);
        }

        if changes.is_empty() {
            debug!(post_id = %post.id, "Nothing to update");
            return Ok(PostResponse::from(post));
        }

        let updated = self
            .ctx
            .post_repo()
            .update_draft(post.id, principal.id, &changes, now)
            .await?;

        info!(post_id = %updated.id, fields = ?changes.changed_fields(), "Draft updated");

        Ok(PostResponse::from(updated))
    }

    /// Delete the caller's own draft
    #[instrument(skip(self))]
    pub async fn delete_draft_post(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
    ) -> ServiceResult<()> {
        let guard = self.guard();
        let principal = guard.require(identity, Permissions::DELETE_POSTS).await?;

        let post = self.find_post(post_id).await?;
        guard.enforce(
            &principal,
            check_post_mutation(&principal, &post, Permissions::DELETE_POSTS),
            "delete_post",
        )?;

        self.ctx
            .post_repo()
            .delete_draft(post.id, principal.id)
            .await?;

        info!(post_id = %post.id, "Draft deleted");

        Ok(())
    }

    async fn find_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        self.ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post", post_id.to_string()))
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> ServiceResult<()> {
        if self.ctx.post_repo().slug_exists(slug, except).await? {
            return Err(ServiceError::conflict(format!("Slug already in use: {slug}")));
        }
        Ok(())
    }
}

fn parse_status(status: Option<&str>) -> ServiceResult<Option<PostStatus>> {
    status
        .map(|s| {
            s.parse::<PostStatus>()
                .map_err(|_| ServiceError::validation("status", "must be draft or published"))
        })
        .transpose()
}

fn slug_from_title(title: &str) -> ServiceResult<String> {
    let slug = text::slugify(title);
    if slug.is_empty() {
        return Err(ServiceError::validation(
            "title",
            "must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}

fn checked_slug(slug: &str) -> ServiceResult<String> {
    if !text::is_valid_slug(slug) {
        return Err(ServiceError::validation(
            "slug",
            "must be lowercase letters, digits and single hyphens",
        ));
    }
    Ok(slug.to_string())
}

/// Trim, drop empties and duplicates, keep first-seen order
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
