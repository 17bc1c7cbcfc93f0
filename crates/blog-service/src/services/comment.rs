//! Comment service
//!
//! Handles commenting and the report → hide/unhide/delete moderation workflow.

use blog_core::access::{can_read_post, check_permission, Identity, Principal};
use blog_core::entities::{Comment, CommentReport, HiddenInfo, ReportReason, MAX_COMMENT_LENGTH};
use blog_core::traits::ModerationQuery;
use blog_core::{DomainError, Permissions};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    CommentReportResponse, CommentResponse, CreateCommentRequest, HideCommentRequest,
    ModerationListQuery, PaginatedResponse, ReportCommentRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guard::AuthorizationGuard;
use super::pagination::Page;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn guard(&self) -> AuthorizationGuard<'a> {
        AuthorizationGuard::new(self.ctx)
    }

    /// Comment on a post the caller can read
    #[instrument(skip(self, request))]
    pub async fn create_comment(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
        request: CreateCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        let principal = self.guard().authenticate(identity).await?;
        request.validate()?;

        if request.content.trim().is_empty() {
            return Err(ServiceError::validation("content", "must not be empty"));
        }
        if request.content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_COMMENT_LENGTH,
            }
            .into());
        }

        self.ensure_post_readable(Some(&principal), post_id).await?;

        let comment = Comment::new(
            Uuid::new_v4(),
            post_id,
            principal.id,
            request.content,
            self.ctx.now(),
        );
        self.ctx.comment_repo().create(&comment).await?;

        info!(
            comment_id = %comment.id,
            post_id = %post_id,
            author_id = %principal.id,
            "Comment created"
        );

        Ok(CommentResponse::from(comment))
    }

    /// Comments on a post, oldest first
    ///
    /// Hidden comments are left out unless asked for, and asking for them
    /// needs `moderate_comments`.
    #[instrument(skip(self))]
    pub async fn list_comments_for_post(
        &self,
        identity: Option<Identity>,
        post_id: Uuid,
        include_hidden: bool,
    ) -> ServiceResult<Vec<CommentResponse>> {
        let guard = self.guard();
        let viewer = guard.principal(identity).await?;

        if include_hidden {
            let principal = viewer.ok_or(ServiceError::Unauthenticated)?;
            guard.enforce(
                &principal,
                check_permission(&principal, Permissions::MODERATE_COMMENTS),
                "list_hidden_comments",
            )?;
        }

        self.ensure_post_readable(viewer.as_ref(), post_id).await?;

        let comments = self
            .ctx
            .comment_repo()
            .list_for_post(post_id, include_hidden)
            .await?;

        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    /// Moderation queue: reported-and-visible first, then by report count and recency
    #[instrument(skip(self))]
    pub async fn list_comments_for_moderation(
        &self,
        identity: Option<Identity>,
        query: ModerationListQuery,
    ) -> ServiceResult<PaginatedResponse<CommentResponse>> {
        self.guard()
            .require(identity, Permissions::MODERATE_COMMENTS)
            .await?;

        let page = Page::resolve(self.ctx.policy(), &query.page);
        let moderation = ModerationQuery {
            filter: query.filter,
            limit: page.limit(),
            offset: page.offset(),
        };

        let repo = self.ctx.comment_repo();
        let total = repo.count_for_moderation(query.filter).await?;
        let comments = repo.list_for_moderation(&moderation).await?;

        Ok(PaginatedResponse::new(comments, page.page, page.per_page, total)
            .map(CommentResponse::from))
    }

    /// File a report; one per reporter per comment
    #[instrument(skip(self, request))]
    pub async fn report_comment(
        &self,
        identity: Option<Identity>,
        comment_id: Uuid,
        request: ReportCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        let principal = self.guard().authenticate(identity).await?;
        request.validate()?;

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::validation("reason", "must not be empty"));
        }
        let reason: ReportReason = reason
            .parse()
            .map_err(|e: String| ServiceError::validation("reason", e))?;

        self.guard().readable_comment(&principal, comment_id).await?;

        let report = CommentReport {
            id: Uuid::new_v4(),
            comment_id,
            reporter_id: principal.id,
            reason,
            description: request.description.filter(|d| !d.trim().is_empty()),
            created_at: self.ctx.now(),
        };

        let comment = self.ctx.comment_repo().report(&report).await?;

        info!(
            comment_id = %comment_id,
            reporter_id = %principal.id,
            reason = reason.as_str(),
            report_count = comment.report_count,
            "Comment reported"
        );

        Ok(CommentResponse::from(comment))
    }

    /// Hide a comment from public listings
    #[instrument(skip(self, request))]
    pub async fn hide_comment(
        &self,
        identity: Option<Identity>,
        comment_id: Uuid,
        request: HideCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        let principal = self
            .guard()
            .require(identity, Permissions::MODERATE_COMMENTS)
            .await?;
        request.validate()?;

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::validation("reason", "must not be empty"));
        }

        let info = HiddenInfo {
            hidden_by: principal.id,
            hidden_at: self.ctx.now(),
            reason: reason.to_string(),
        };
        let comment = self.ctx.comment_repo().hide(comment_id, &info).await?;

        info!(comment_id = %comment_id, moderator_id = %principal.id, "Comment hidden");

        Ok(CommentResponse::from(comment))
    }

    /// Restore a hidden comment; report state is kept
    #[instrument(skip(self))]
    pub async fn unhide_comment(
        &self,
        identity: Option<Identity>,
        comment_id: Uuid,
    ) -> ServiceResult<CommentResponse> {
        let principal = self
            .guard()
            .require(identity, Permissions::MODERATE_COMMENTS)
            .await?;

        let comment = self.ctx.comment_repo().unhide(comment_id).await?;

        info!(comment_id = %comment_id, moderator_id = %principal.id, "Comment unhidden");

        Ok(CommentResponse::from(comment))
    }

    /// Permanently remove a comment with its reports and likes
    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        identity: Option<Identity>,
        comment_id: Uuid,
    ) -> ServiceResult<()> {
        let principal = self
            .guard()
            .require(identity, Permissions::DELETE_COMMENTS)
            .await?;

        self.ctx.comment_repo().delete(comment_id).await?;

        info!(comment_id = %comment_id, moderator_id = %principal.id, "Comment deleted");

        Ok(())
    }

    /// Reports filed against a comment, newest first
    #[instrument(skip(self))]
    pub async fn list_reports_for_comment(
        &self,
        identity: Option<Identity>,
        comment_id: Uuid,
    ) -> ServiceResult<Vec<CommentReportResponse>> {
        self.guard()
            .require(identity, Permissions::MODERATE_COMMENTS)
            .await?;

        if self.ctx.comment_repo().find_by_id(comment_id).await?.is_none() {
            return Err(ServiceError::not_found("Comment", comment_id.to_string()));
        }

        let reports = self.ctx.comment_repo().reports_for(comment_id).await?;

        Ok(reports.into_iter().map(CommentReportResponse::from).collect())
    }


    /// A missing post and an unreadable draft look the same to the caller
    async fn ensure_post_readable(
        &self,
        viewer: Option<&Principal>,
        post_id: Uuid,
    ) -> ServiceResult<()> {
        self.ctx
            .post_repo()
            .find_by_id(post_id)
            .await?
            .filter(|post| can_read_post(viewer, post))
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Post", post_id.to_string()))
    }
}
