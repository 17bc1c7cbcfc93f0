//! Access decisions
//!
//! Pure functions that turn a principal, a permission and (optionally) a
//! target into an allow/deny decision. Nothing here touches storage; the
//! service layer loads the principal and the target, then asks.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::entities::{Post, PostStatus, User, UserChanges};
use crate::value_objects::{Permissions, Role};

/// Identity hint handed over by the session layer
///
/// Only `user_id` is trusted. The claimed role is compared against the
/// stored role for diagnostics and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub claimed_role: Option<Role>,
}

impl Identity {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            claimed_role: None,
        }
    }

    pub fn with_claimed_role(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            claimed_role: Some(role),
        }
    }
}

/// An authenticated actor with its current, store-derived role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    #[inline]
    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.role)
    }

    #[inline]
    pub fn can(&self, permission: Permissions) -> bool {
        self.permissions().has(permission)
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Why an operation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    MissingPermission(Permissions),
    NotOwner,
    NotDraft,
    SelfDemotion,
    SelfDeletion,
    SelfDeactivation,
    AccountInactive,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::MissingPermission(_) => "missing permission",
            Self::NotOwner => "not your post",
            Self::NotDraft => "not a draft",
            Self::SelfDemotion => "self-demotion",
            Self::SelfDeletion => "self-deletion",
            Self::SelfDeactivation => "self-deactivation",
            Self::AccountInactive => "account inactive",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPermission(p) => write!(f, "missing permission: {p}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome of an access check
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Run the next check only if this one allowed
    pub fn and_then(self, next: impl FnOnce() -> Decision) -> Decision {
        match self {
            Self::Allow => next(),
            deny @ Self::Deny(_) => deny,
        }
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

fn deny_unless(condition: bool, reason: DenyReason) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(reason)
    }
}

/// Does the principal hold `permission`?
pub fn check_permission(principal: &Principal, permission: Permissions) -> Decision {
    deny_unless(
        principal.can(permission),
        DenyReason::MissingPermission(permission),
    )
}

/// Edit/delete gate for posts: permission, then owner, then draft state
///
/// Every role is held to owner-and-draft-only, admins included.
pub fn check_post_mutation(
    principal: &Principal,
    post: &Post,
    permission: Permissions,
) -> Decision {
    check_permission(principal, permission)
        .and_then(|| deny_unless(post.is_owned_by(principal.id), DenyReason::NotOwner))
        .and_then(|| deny_unless(post.is_draft(), DenyReason::NotDraft))
}

/// Can `viewer` (or an anonymous caller) read this post at all?
pub fn can_read_post(viewer: Option<&Principal>, post: &Post) -> bool {
    match (post.status, viewer) {
        (PostStatus::Published, None) => true,
        (PostStatus::Published, Some(p)) => p.can(Permissions::READ_POSTS),
        (PostStatus::Draft, None) => false,
        (PostStatus::Draft, Some(p)) => {
            post.is_owned_by(p.id) || p.can(Permissions::READ_DRAFTS)
        }
    }
}

/// Role/status changes: `manage_users`, and no admin may demote or
/// deactivate themselves
pub fn check_user_change(actor: &Principal, target_id: Uuid, changes: &UserChanges) -> Decision {
    let is_self = actor.id == target_id;
    check_permission(actor, Permissions::MANAGE_USERS)
        .and_then(|| {
            let demotes_self = is_self
                && actor.role == Role::Admin
                && changes.role.is_some_and(|r| r != Role::Admin);
            deny_unless(!demotes_self, DenyReason::SelfDemotion)
        })
        .and_then(|| {
            let deactivates_self = is_self && changes.is_active == Some(false);
            deny_unless(!deactivates_self, DenyReason::SelfDeactivation)
        })
}

/// Account deletion: `manage_users`, and never your own account
pub fn check_user_deletion(actor: &Principal, target_id: Uuid) -> Decision {
    check_permission(actor, Permissions::MANAGE_USERS)
        .and_then(|| deny_unless(actor.id != target_id, DenyReason::SelfDeletion))
}

/// Status filter requested by a post listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostFilter {
    Published,
    Draft,
    #[default]
    All,
}

/// Which posts a listing may return, after applying role rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Every post, any status
    Everything,
    PublishedOnly,
    /// Drafts from any author
    AllDrafts,
    /// Drafts written by one user
    DraftsBy(Uuid),
    /// Published posts plus one user's drafts
    PublishedOrDraftsBy(Uuid),
    /// Nothing at all
    Nothing,
}

impl PostScope {
    /// Resolve the scope for a caller and requested filter
    pub fn resolve(viewer: Option<&Principal>, filter: PostFilter) -> Self {
        let Some(principal) = viewer else {
            return match filter {
                PostFilter::Draft => Self::Nothing,
                PostFilter::Published | PostFilter::All => Self::PublishedOnly,
            };
        };

        let sees_all_drafts = principal.can(Permissions::READ_DRAFTS);
        match (filter, sees_all_drafts) {
            (PostFilter::Published, _) => Self::PublishedOnly,
            (PostFilter::Draft, true) => Self::AllDrafts,
            (PostFilter::Draft, false) => Self::DraftsBy(principal.id),
            (PostFilter::All, true) => Self::Everything,
            (PostFilter::All, false) => Self::PublishedOrDraftsBy(principal.id),
        }
    }

    /// In-process predicate matching the SQL the Postgres adapter builds
    pub fn includes(&self, post: &Post) -> bool {
        match *self {
            Self::Everything => true,
            Self::PublishedOnly => post.is_published(),
            Self::AllDrafts => post.is_draft(),
            Self::DraftsBy(id) => post.is_draft() && post.is_owned_by(id),
            Self::PublishedOrDraftsBy(id) => {
                post.is_published() || (post.is_draft() && post.is_owned_by(id))
            }
            Self::Nothing => false,
        }
    }
}
