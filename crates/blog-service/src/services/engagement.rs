//! Engagement service
//!
//! Likes, bookmarks, view recording and counter reconciliation.

use blog_core::access::{can_read_post, Identity, Principal};
use blog_core::entities::{
    CommentCounters, EngagementKind, Post, PostCounters, PostView, ToggleOutcome, ViewOutcome,
};
use blog_core::Permissions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::dto::{EngagementStateResponse, PageParams, PostResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guard::AuthorizationGuard;
use super::pagination::Page;

/// What a like is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LikeTarget {
    Post(Uuid),
    Comment(Uuid),
}

/// Engagement service
pub struct EngagementService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EngagementService<'a> {
    /// Create a new EngagementService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn guard(&self) -> AuthorizationGuard<'a> {
        AuthorizationGuard::new(self.ctx)
    }

    /// Like or unlike a published post or a comment
    #[instrument(skip(self))]
    pub async fn toggle_like(
        &self,
        identity: Option<Identity>,
        target: LikeTarget,
    ) -> ServiceResult<ToggleOutcome> {
        let principal = self.guard().authenticate(identity).await?;

        let (kind, target_id) = match target {
            LikeTarget::Post(post_id) => {
                self.published_post(post_id).await?;
                (EngagementKind::PostLike, post_id)
            }
            LikeTarget::Comment(comment_id) => {
                self.guard().readable_comment(&principal, comment_id).await?;
                (EngagementKind::CommentLike, comment_id)
            }
        };

        let outcome = self
            .ctx
            .engagement_repo()
            .toggle(kind, target_id, principal.id)
            .await?;

        info!(
            kind = kind.as_str(),
            target_id = %target_id,
            user_id = %principal.id,
            active = outcome.active,
            count = outcome.count,
            "Like toggled"
        );

        Ok(outcome)
    }

    /// Bookmark or un-bookmark a published post
    #[instrument(skip(self))]
    pub async fn toggle_bookmark(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
    ) -> ServiceResult<ToggleOutcome> {
        let principal = self.guard().authenticate(identity).await?;
        self.published_post(post_id).await?;

        let outcome = self
            .ctx
            .engagement_repo()
            .toggle(EngagementKind::PostBookmark, post_id, principal.id)
            .await?;

        info!(
            post_id = %post_id,
            user_id = %principal.id,
            active = outcome.active,
            count = outcome.count,
            "Bookmark toggled"
        );

        Ok(outcome)
    }

    /// Record a view; repeat views by the same viewer inside the policy
    /// window are stored but not counted
    #[instrument(skip(self))]
    pub async fn record_view(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
        ip_address: &str,
    ) -> ServiceResult<ViewOutcome> {
        let viewer = self.guard().principal(identity).await?;
        self.readable_post(viewer.as_ref(), post_id).await?;

        let view = PostView::new(
            post_id,
            viewer.map(|p| p.id),
            ip_address,
            self.ctx.now(),
        );

        let outcome = self
            .ctx
            .engagement_repo()
            .record_view(view, self.ctx.policy().view_dedup_window())
            .await?;

        debug!(
            post_id = %post_id,
            counted = outcome.counted,
            views_count = outcome.views_count,
            "View recorded"
        );

        Ok(outcome)
    }

    /// Whether the caller liked/bookmarked a post, with its counters
    #[instrument(skip(self))]
    pub async fn get_engagement(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
    ) -> ServiceResult<EngagementStateResponse> {
        let principal = self.guard().authenticate(identity).await?;
        let post = self.readable_post(Some(&principal), post_id).await?;

        let repo = self.ctx.engagement_repo();
        let liked = repo
            .is_active(EngagementKind::PostLike, post_id, principal.id)
            .await?;
        let bookmarked = repo
            .is_active(EngagementKind::PostBookmark, post_id, principal.id)
            .await?;

        Ok(EngagementStateResponse {
            liked,
            bookmarked,
            likes_count: post.likes_count,
            bookmarks_count: post.bookmarks_count,
            views_count: post.views_count,
        })
    }

    /// The caller's bookmarked posts, most recent bookmark first
    #[instrument(skip(self))]
    pub async fn list_bookmarks(
        &self,
        identity: Option<Identity>,
        params: PageParams,
    ) -> ServiceResult<Vec<PostResponse>> {
        let principal = self.guard().authenticate(identity).await?;
        let page = Page::resolve(self.ctx.policy(), &params);

        let posts = self
            .ctx
            .engagement_repo()
            .bookmarked_posts(principal.id, page.limit(), page.offset())
            .await?;

        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    /// Recompute a post's counters from the detail tables
    #[instrument(skip(self))]
    pub async fn reconcile_post_counters(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
    ) -> ServiceResult<PostCounters> {
        let principal = self
            .guard()
            .require(identity, Permissions::MANAGE_SETTINGS)
            .await?;

        let counters = self.ctx.engagement_repo().recount_post(post_id).await?;

        info!(
            post_id = %post_id,
            admin_id = %principal.id,
            ?counters,
            "Post counters reconciled"
        );

        Ok(counters)
    }

    /// Recompute a comment's counters from the detail tables
    #[instrument(skip(self))]
    pub async fn reconcile_comment_counters(
        &self,
        identity: Option<Identity>,
        comment_id: Uuid,
    ) -> ServiceResult<CommentCounters> {
        let principal = self
            .guard()
            .require(identity, Permissions::MANAGE_SETTINGS)
            .await?;

        let counters = self
            .ctx
            .engagement_repo()
            .recount_comment(comment_id)
            .await?;

        info!(
            comment_id = %comment_id,
            admin_id = %principal.id,
            ?counters,
            "Comment counters reconciled"
        );

        Ok(counters)
    }

    async fn published_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        self.ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .filter(Post::is_published)
            .ok_or_else(|| ServiceError::not_found("Post", post_id.to_string()))
    }

    async fn readable_post(
        &self,
        viewer: Option<&Principal>,
        post_id: Uuid,
    ) -> ServiceResult<Post> {
        self.ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .filter(|post| can_read_post(viewer, post))
            .ok_or_else(|| ServiceError::not_found("Post", post_id.to_string()))
    }
}
