//! Response DTOs for service operations
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use blog_core::entities::{Comment, CommentReport, Post, PostStatus, ReportReason, User};
use blog_core::Role;

// ============================================================================
// Common Response Types
// ============================================================================

/// One page of results plus the total across all pages
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let per_page_i64 = i64::from(per_page.max(1));
        let total_pages = u32::try_from((total.max(0) + per_page_i64 - 1) / per_page_i64)
            .unwrap_or(u32::MAX);

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }

    /// Convert every item, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Post Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub status: PostStatus,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub views_count: i64,
    pub likes_count: i64,
    pub bookmarks_count: i64,
    pub reading_time_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            status: post.status,
            title: post.title,
            slug: post.slug,
            content: post.content,
            excerpt: post.excerpt,
            tags: post.tags,
            category: post.category,
            views_count: post.views_count,
            likes_count: post.likes_count,
            bookmarks_count: post.bookmarks_count,
            reading_time_minutes: post.reading_time_minutes,
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

// ============================================================================
// Comment Responses
// ============================================================================

/// Comment with its moderation state
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub likes_count: i64,
    pub report_count: i64,
    pub is_reported: bool,
    pub is_hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        let (hidden_by, hidden_at, hidden_reason) = match comment.hidden {
            Some(info) => (Some(info.hidden_by), Some(info.hidden_at), Some(info.reason)),
            None => (None, None, None),
        };

        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            likes_count: comment.likes_count,
            report_count: comment.report_count,
            is_reported: comment.is_reported,
            is_hidden: comment.is_hidden,
            hidden_by,
            hidden_at,
            hidden_reason,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentReportResponse {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: ReportReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CommentReport> for CommentReportResponse {
    fn from(report: CommentReport) -> Self {
        Self {
            id: report.id,
            comment_id: report.comment_id,
            reporter_id: report.reporter_id,
            reason: report.reason,
            description: report.description,
            created_at: report.created_at,
        }
    }
}

// ============================================================================
// Engagement Responses
// ============================================================================

/// Caller's own engagement with a post, plus its public counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementStateResponse {
    pub liked: bool,
    pub bookmarked: bool,
    pub likes_count: i64,
    pub bookmarks_count: i64,
    pub views_count: i64,
}
