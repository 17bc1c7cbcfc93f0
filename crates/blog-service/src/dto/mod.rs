//! Data transfer objects for service requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for operation inputs
//! - Response DTOs for serializing operation outputs

pub mod requests;
pub mod responses;

pub use requests::{
    CreateCommentRequest, CreatePostRequest, HideCommentRequest, ListPostsQuery,
    ModerationListQuery, PageParams, RegisterUserRequest, ReportCommentRequest,
    UpdatePostRequest, UpdateUserRequest,
};

pub use responses::{
    CommentReportResponse, CommentResponse, EngagementStateResponse, PaginatedResponse,
    PostResponse, UserResponse,
};
