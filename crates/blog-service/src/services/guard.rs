//! Authorization guard
//!
//! Resolves the caller's identity hint into a [`Principal`] whose role is
//! always re-read from the user store, then enforces access decisions.

use blog_core::access::{
    can_read_post, check_permission, Decision, DenyReason, Identity, Principal,
};
use blog_core::entities::Comment;
use blog_core::Permissions;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Guard that every protected operation goes through first
pub struct AuthorizationGuard<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthorizationGuard<'a> {
    /// Create a new AuthorizationGuard
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve an optional identity
    ///
    /// Anonymous callers yield `Ok(None)`. An identity whose user is gone is
    /// `Unauthenticated`; a deactivated account is `Forbidden(AccountInactive)`.
    #[instrument(skip(self))]
    pub async fn principal(&self, identity: Option<Identity>) -> ServiceResult<Option<Principal>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        let Some(user) = self.ctx.user_repo().find_by_id(identity.user_id).await? else {
            warn!(user_id = %identity.user_id, "Identity does not resolve to a user");
            return Err(ServiceError::Unauthenticated);
        };

        if !user.is_active {
            warn!(user_id = %user.id, "Inactive account attempted access");
            return Err(ServiceError::forbidden(DenyReason::AccountInactive));
        }

        if let Some(claimed) = identity.claimed_role {
            if claimed != user.role {
                warn!(
                    user_id = %user.id,
                    claimed = claimed.as_str(),
                    stored = user.role.as_str(),
                    "Claimed role differs from stored role; using stored role"
                );
            }
        }

        Ok(Some(Principal::from(&user)))
    }

    /// Resolve an identity that must be present
    pub async fn authenticate(&self, identity: Option<Identity>) -> ServiceResult<Principal> {
        self.principal(identity)
            .await?
            .ok_or(ServiceError::Unauthenticated)
    }

    /// Authenticate and require one permission
    pub async fn require(
        &self,
        identity: Option<Identity>,
        permission: Permissions,
    ) -> ServiceResult<Principal> {
        let principal = self.authenticate(identity).await?;
        self.enforce(&principal, check_permission(&principal, permission), "require")?;
        Ok(principal)
    }

    /// Turn a decision into a result, logging it
    pub fn enforce(
        &self,
        principal: &Principal,
        decision: Decision,
        action: &'static str,
    ) -> ServiceResult<()> {
        match decision {
            Decision::Allow => {
                debug!(
                    principal_id = %principal.id,
                    role = principal.role.as_str(),
                    action,
                    "Access allowed"
                );
                Ok(())
            }
            Decision::Deny(reason) => {
                warn!(
                    principal_id = %principal.id,
                    role = principal.role.as_str(),
                    action,
                    reason = %reason,
                    "Access denied"
                );
                Err(ServiceError::from(reason))
            }
        }
    }

    /// Load a comment whose post the caller can read
    ///
    /// A comment under someone else's unreadable draft is `NotFound`, the
    /// same as a comment that does not exist.
    pub async fn readable_comment(
        &self,
        viewer: &Principal,
        comment_id: Uuid,
    ) -> ServiceResult<Comment> {
        let not_found = || ServiceError::not_found("Comment", comment_id.to_string());
        let comment = self
            .ctx
            .comment_repo()
            .find_by_id(comment_id)
            .await?
            .ok_or_else(not_found)?;

        let post = self.ctx.post_repo().find_by_id(comment.post_id).await?;
        if !post.is_some_and(|post| can_read_post(Some(viewer), &post)) {
            debug!(
                comment_id = %comment_id,
                principal_id = %viewer.id,
                "Comment sits under an unreadable post"
            );
            return Err(not_found());
        }
        Ok(comment)
    }
}
