//! Analytics service

use blog_core::access::Identity;
use blog_core::entities::ContentStats;
use blog_core::Permissions;
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::AuthorizationGuard;

/// Analytics service
pub struct AnalyticsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AnalyticsService<'a> {
    /// Create a new AnalyticsService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Site-wide totals for posts, views, likes and comments
    #[instrument(skip(self))]
    pub async fn content_stats(&self, identity: Option<Identity>) -> ServiceResult<ContentStats> {
        AuthorizationGuard::new(self.ctx)
            .require(identity, Permissions::VIEW_ANALYTICS)
            .await?;

        Ok(self.ctx.analytics_repo().content_stats().await?)
    }
}
