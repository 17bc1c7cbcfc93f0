//! Request DTOs for service operations
//!
//! Payload structs implement `Deserialize` and `Validate` for input validation.
//! Enum-valued fields that must report a validation error (rather than a
//! deserialization failure) are carried as strings and parsed by the service.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use blog_core::access::PostFilter;
use blog_core::entities::ModerationFilter;
use blog_core::traits::PostSort;

// ============================================================================
// Pagination
// ============================================================================

/// Page/per-page pagination, 1-based
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// ============================================================================
// User Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Role/status change made by an admin
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// One of admin, editor, author, viewer
    pub role: Option<String>,

    pub is_active: Option<bool>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
}

// ============================================================================
// Post Requests
// ============================================================================

/// Create post request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    /// Overrides the slug derived from the title
    #[validate(length(min = 1, max = 200, message = "Slug must be 1-200 characters"))]
    pub slug: Option<String>,

    /// Overrides the excerpt derived from the content
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 tags"))]
    pub tags: Vec<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    /// `draft` (default) or `published`
    pub status: Option<String>,

    /// Ignored; the author is always the caller
    pub author_id: Option<Uuid>,
}

/// Partial update of a draft; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Slug must be 1-200 characters"))]
    pub slug: Option<String>,

    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[validate(length(max = 20, message = "At most 20 tags"))]
    pub tags: Option<Vec<String>>,

    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    /// `published` publishes the draft
    pub status: Option<String>,
}

/// Post listing query
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub filter: PostFilter,

    #[serde(default)]
    pub sort: PostSort,

    #[validate(length(min = 1, max = 200, message = "Search must be 1-200 characters"))]
    pub search: Option<String>,

    pub tag: Option<String>,

    pub category: Option<String>,

    pub author_id: Option<Uuid>,

    #[serde(flatten)]
    pub page: PageParams,
}

// ============================================================================
// Comment Requests
// ============================================================================

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

/// Report a comment
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReportCommentRequest {
    /// spam, harassment, inappropriate, offensive, misinformation or other
    pub reason: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Hide a comment
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HideCommentRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: String,
}

/// Moderation queue query
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ModerationListQuery {
    #[serde(default)]
    pub filter: ModerationFilter,

    #[serde(flatten)]
    pub page: PageParams,
}
