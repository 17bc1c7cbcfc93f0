//! # blog-service
//!
//! Application layer containing business logic, services, and DTOs.
//!
//! Every operation takes the caller's [`Identity`](blog_core::Identity) hint
//! (or `None` for anonymous callers), resolves it through the
//! [`AuthorizationGuard`] and returns a [`ServiceResult`].

pub mod dto;
pub mod services;

pub use services::{
    AnalyticsService, AuthorizationGuard, CommentService, EngagementService, LikeTarget,
    PostService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    UserService,
};
