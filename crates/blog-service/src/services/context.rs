//! Service context - dependency container for services
//!
//! Holds all repositories, the clock and the content policy needed by services.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use blog_common::ContentPolicy;
use blog_core::traits::{
    AnalyticsRepository, Clock, CommentRepository, EngagementRepository, PostRepository,
    SystemClock, UserRepository,
};
use blog_db::{
    MemoryStore, PgAnalyticsRepository, PgCommentRepository, PgEngagementRepository, PgPool,
    PgPostRepository, PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Repositories (PostgreSQL or in-memory)
/// - The clock every timestamp is taken from
/// - The content policy (view window, reading speed, excerpt and page sizes)
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    engagement_repo: Arc<dyn EngagementRepository>,
    analytics_repo: Arc<dyn AnalyticsRepository>,

    clock: Arc<dyn Clock>,
    policy: ContentPolicy,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        post_repo: Arc<dyn PostRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        engagement_repo: Arc<dyn EngagementRepository>,
        analytics_repo: Arc<dyn AnalyticsRepository>,
        clock: Arc<dyn Clock>,
        policy: ContentPolicy,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            comment_repo,
            engagement_repo,
            analytics_repo,
            clock,
            policy,
        }
    }

    /// Context backed by PostgreSQL repositories and the system clock
    pub fn postgres(pool: PgPool, policy: ContentPolicy) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgPostRepository::new(pool.clone())),
            Arc::new(PgCommentRepository::new(pool.clone())),
            Arc::new(PgEngagementRepository::new(pool.clone())),
            Arc::new(PgAnalyticsRepository::new(pool)),
            Arc::new(SystemClock),
            policy,
        )
    }

    /// Context where every repository is the same in-memory store
    pub fn in_memory(store: MemoryStore, clock: Arc<dyn Clock>, policy: ContentPolicy) -> Self {
        let store = Arc::new(store);
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            clock,
            policy,
        )
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the post repository
    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    /// Get the comment repository
    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    /// Get the engagement repository
    pub fn engagement_repo(&self) -> &dyn EngagementRepository {
        self.engagement_repo.as_ref()
    }

    /// Get the analytics repository
    pub fn analytics_repo(&self) -> &dyn AnalyticsRepository {
        self.analytics_repo.as_ref()
    }

    // === Time & Policy ===

    /// Current time according to the configured clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Content policy in effect
    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("clock", &"dyn Clock")
            .field("policy", &self.policy)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// The clock defaults to [`SystemClock`] and the policy to
/// [`ContentPolicy::default`]; every repository is required.
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    engagement_repo: Option<Arc<dyn EngagementRepository>>,
    analytics_repo: Option<Arc<dyn AnalyticsRepository>>,
    clock: Option<Arc<dyn Clock>>,
    policy: Option<ContentPolicy>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn engagement_repo(mut self, repo: Arc<dyn EngagementRepository>) -> Self {
        self.engagement_repo = Some(repo);
        self
    }

    pub fn analytics_repo(mut self, repo: Arc<dyn AnalyticsRepository>) -> Self {
        self.analytics_repo = Some(repo);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn policy(mut self, policy: ContentPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let missing = |name: &str| ServiceError::validation(name, "is required");

        Ok(ServiceContext::new(
            self.user_repo.ok_or_else(|| missing("user_repo"))?,
            self.post_repo.ok_or_else(|| missing("post_repo"))?,
            self.comment_repo.ok_or_else(|| missing("comment_repo"))?,
            self.engagement_repo.ok_or_else(|| missing("engagement_repo"))?,
            self.analytics_repo.ok_or_else(|| missing("analytics_repo"))?,
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.policy.unwrap_or_default(),
        ))
    }
}
