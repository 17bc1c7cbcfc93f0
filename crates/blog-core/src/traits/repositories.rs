//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Operations documented as atomic must run
//! as one transaction (or under one lock) in every implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::PostScope;
use crate::entities::{
    Comment, CommentCounters, CommentReport, ContentStats, EngagementKind, HiddenInfo,
    ModerationFilter, Post, PostChanges, PostCounters, PostView, ToggleOutcome, User,
    UserChanges, ViewOutcome,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// List users, oldest account first
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<User>>;

    async fn count(&self) -> RepoResult<i64>;

    /// Create a new user; duplicate email is `EmailAlreadyExists`
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Apply a partial update and return the stored row
    async fn update(&self, id: Uuid, changes: &UserChanges, now: DateTime<Utc>)
        -> RepoResult<User>;

    /// Remove a user
    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Post Repository
// ============================================================================

/// Sort order for post listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    MostViewed,
    MostLiked,
    Title,
}

/// Composable post listing query
///
/// Every filter is optional and they combine with AND; `scope` carries the
/// role-dependent visibility rule.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub scope: PostScope,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub author_id: Option<Uuid>,
    pub sort: PostSort,
    pub limit: i64,
    pub offset: i64,
}

impl PostQuery {
    pub fn new(scope: PostScope) -> Self {
        Self {
            scope,
            search: None,
            tag: None,
            category: None,
            author_id: None,
            sort: PostSort::default(),
            limit: 10,
            offset: 0,
        }
    }

    /// In-process filter matching the SQL predicates
    pub fn matches(&self, post: &Post) -> bool {
        self.scope.includes(post)
            && self.search.as_deref().is_none_or(|s| post.matches_search(s))
            && self.tag.as_deref().is_none_or(|t| post.tags.iter().any(|pt| pt == t))
            && self
                .category
                .as_deref()
                .is_none_or(|c| post.category.as_deref() == Some(c))
            && self.author_id.is_none_or(|a| post.author_id == a)
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>>;

    /// Exact, case-sensitive slug lookup
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;

    /// Whether a slug is taken by any post other than `except`
    async fn slug_exists(&self, slug: &str, except: Option<Uuid>) -> RepoResult<bool>;

    /// Insert a post; duplicate slug is `SlugAlreadyExists`
    async fn create(&self, post: &Post) -> RepoResult<()>;

    /// Apply all changed fields to `author_id`'s draft in one write and
    /// return the stored row
    ///
    /// The draft/ownership check is part of the write: a post that is no
    /// longer a draft is `InvalidTransition`, another author's post is
    /// `NotPostOwner`.
    async fn update_draft(
        &self,
        id: Uuid,
        author_id: Uuid,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> RepoResult<Post>;

    /// Remove `author_id`'s draft, with the same check as `update_draft`
    async fn delete_draft(&self, id: Uuid, author_id: Uuid) -> RepoResult<()>;

    async fn list(&self, query: &PostQuery) -> RepoResult<Vec<Post>>;

    /// Total rows matching `query`, ignoring limit/offset
    async fn count(&self, query: &PostQuery) -> RepoResult<i64>;
}

// ============================================================================
// Comment Repository
// ============================================================================

/// Moderation queue query
#[derive(Debug, Clone, Copy)]
pub struct ModerationQuery {
    pub filter: ModerationFilter,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Comment>>;

    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    /// Hard delete, including reports and likes
    async fn delete(&self, id: Uuid) -> RepoResult<()>;

    /// Comments on a post, oldest first
    async fn list_for_post(&self, post_id: Uuid, include_hidden: bool)
        -> RepoResult<Vec<Comment>>;

    /// Moderation queue, ordered by `moderation_order`
    async fn list_for_moderation(&self, query: &ModerationQuery) -> RepoResult<Vec<Comment>>;

    async fn count_for_moderation(&self, filter: ModerationFilter) -> RepoResult<i64>;

    /// Store a report and bump the comment's report counter (atomic)
    ///
    /// A second report from the same reporter is `DuplicateReport` and
    /// leaves the counter untouched.
    async fn report(&self, report: &CommentReport) -> RepoResult<Comment>;

    /// Reports filed against a comment, newest first
    async fn reports_for(&self, comment_id: Uuid) -> RepoResult<Vec<CommentReport>>;

    async fn hide(&self, id: Uuid, info: &HiddenInfo) -> RepoResult<Comment>;

    async fn unhide(&self, id: Uuid) -> RepoResult<Comment>;
}

// ============================================================================
// Engagement Repository
// ============================================================================

#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Flip a like/bookmark row and adjust the target's counter (atomic)
    async fn toggle(
        &self,
        kind: EngagementKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<ToggleOutcome>;

    /// Whether the (target, user) row exists
    async fn is_active(
        &self,
        kind: EngagementKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<bool>;

    /// Record a view, counting it unless the same viewer already has a
    /// counted view of this post within `window` (atomic)
    async fn record_view(&self, view: PostView, window: Duration) -> RepoResult<ViewOutcome>;

    /// Posts a user bookmarked, most recent bookmark first
    async fn bookmarked_posts(&self, user_id: Uuid, limit: i64, offset: i64)
        -> RepoResult<Vec<Post>>;

    /// Recompute and store a post's counters from the detail tables
    async fn recount_post(&self, post_id: Uuid) -> RepoResult<PostCounters>;

    /// Recompute and store a comment's counters from the detail tables
    async fn recount_comment(&self, comment_id: Uuid) -> RepoResult<CommentCounters>;
}

// ============================================================================
// Analytics Repository
// ============================================================================

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn content_stats(&self) -> RepoResult<ContentStats>;
}
