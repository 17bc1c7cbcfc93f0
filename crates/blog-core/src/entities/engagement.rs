//! Likes, bookmarks and views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of join-row toggle
///
/// Each kind pairs a join table keyed by (target, user) with a
/// denormalized counter on the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    PostLike,
    CommentLike,
    PostBookmark,
}

impl EngagementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostLike => "post_like",
            Self::CommentLike => "comment_like",
            Self::PostBookmark => "post_bookmark",
        }
    }

    /// True when the target is a post rather than a comment
    #[inline]
    pub const fn targets_post(self) -> bool {
        matches!(self, Self::PostLike | Self::PostBookmark)
    }
}

/// Result of a toggle: the new state and the counter after the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: i64,
}

/// Decrement a counter without letting it go negative
#[inline]
pub fn floored_decrement(count: i64) -> i64 {
    (count - 1).max(0)
}

/// One recorded visit to a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_address: String,
    pub viewed_at: DateTime<Utc>,
    /// Whether this view incremented `views_count`
    pub counted: bool,
    /// Recorded without a signed-in viewer
    ///
    /// Stays `false` when the viewer's account is deleted later and
    /// `user_id` is cleared, so such rows never dedup anonymous visitors.
    pub anonymous: bool,
}

impl PostView {
    /// A not-yet-counted view of `post_id`
    pub fn new(
        post_id: Uuid,
        user_id: Option<Uuid>,
        ip_address: impl Into<String>,
        viewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            ip_address: ip_address.into(),
            viewed_at,
            counted: false,
            anonymous: user_id.is_none(),
        }
    }

    /// Whether `self` and `other` come from the same viewer
    ///
    /// Signed-in viewers are matched by user id, anonymous ones by IP.
    pub fn same_viewer(&self, user_id: Option<Uuid>, ip_address: &str) -> bool {
        match (self.user_id, user_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.anonymous && self.ip_address == ip_address,
            _ => false,
        }
    }
}

/// Result of recording a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewOutcome {
    pub counted: bool,
    pub views_count: i64,
}

/// Post counters recomputed from the detail tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct PostCounters {
    pub views_count: i64,
    pub likes_count: i64,
    pub bookmarks_count: i64,
}

/// Comment counters recomputed from the detail tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct CommentCounters {
    pub likes_count: i64,
    pub report_count: i64,
}

/// Site-wide content totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ContentStats {
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub reported_comments: i64,
    pub hidden_comments: i64,
}
