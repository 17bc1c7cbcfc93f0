//! Comment entity and moderation flags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Legacy approval status; new comments are always approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Approved,
    Pending,
    Rejected,
}

impl CommentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown comment status: {other}")),
        }
    }
}

/// Who hid a comment, when, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenInfo {
    pub hidden_by: Uuid,
    pub hidden_at: DateTime<Utc>,
    pub reason: String,
}

/// Comment entity
///
/// `is_reported` and `is_hidden` are independent flags. Reporting is
/// monotonic; hiding is reversible by a moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub likes_count: i64,
    pub report_count: i64,
    pub is_reported: bool,
    pub is_hidden: bool,
    pub hidden: Option<HiddenInfo>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// A fresh, unreported and visible comment
    pub fn new(
        id: Uuid,
        post_id: Uuid,
        author_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            author_id,
            content,
            status: CommentStatus::Approved,
            likes_count: 0,
            report_count: 0,
            is_reported: false,
            is_hidden: false,
            hidden: None,
            created_at: now,
        }
    }

    /// Count one more report
    pub fn register_report(&mut self) {
        self.report_count += 1;
        self.is_reported = true;
    }

    pub fn hide(&mut self, moderator_id: Uuid, reason: String, now: DateTime<Utc>) {
        self.is_hidden = true;
        self.hidden = Some(HiddenInfo {
            hidden_by: moderator_id,
            hidden_at: now,
            reason,
        });
    }

    /// Clear the hidden flag and its metadata; report state is kept
    pub fn unhide(&mut self) {
        self.is_hidden = false;
        self.hidden = None;
    }

    /// Reported and still waiting for a moderator
    #[inline]
    pub fn needs_review(&self) -> bool {
        self.is_reported && !self.is_hidden
    }
}

/// Which comments a moderation listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModerationFilter {
    /// Reported and not yet hidden
    #[default]
    Reported,
    Hidden,
    All,
}

impl ModerationFilter {
    pub fn matches(self, comment: &Comment) -> bool {
        match self {
            Self::Reported => comment.needs_review(),
            Self::Hidden => comment.is_hidden,
            Self::All => true,
        }
    }
}

/// Moderation queue order: needs-review first, then most reports, then newest
pub fn moderation_order(a: &Comment, b: &Comment) -> Ordering {
    b.needs_review()
        .cmp(&a.needs_review())
        .then_with(|| b.report_count.cmp(&a.report_count))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Why a comment was reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportReason {
    Spam,
    Harassment,
    Inappropriate,
    Offensive,
    Misinformation,
    Other,
}

impl ReportReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Harassment => "harassment",
            Self::Inappropriate => "inappropriate",
            Self::Offensive => "offensive",
            Self::Misinformation => "misinformation",
            Self::Other => "other",
        }
    }
}

impl FromStr for ReportReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spam" => Ok(Self::Spam),
            "harassment" => Ok(Self::Harassment),
            "inappropriate" => Ok(Self::Inappropriate),
            "offensive" => Ok(Self::Offensive),
            "misinformation" => Ok(Self::Misinformation),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown report reason: {other}")),
        }
    }
}

/// A user's report against a comment; unique per (comment, reporter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentReport {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
