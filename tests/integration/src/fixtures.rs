//! Test fixtures and data generators
//!
//! Provides reusable request payloads for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use blog_service::dto::{CreatePostRequest, ReportCommentRequest};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// `count` space-separated words
pub fn words(count: usize) -> String {
    vec!["word"; count].join(" ")
}

/// Draft with a unique title
pub fn draft(title: &str) -> CreatePostRequest {
    CreatePostRequest {
        title: format!("{title} {}", unique_suffix()),
        content: format!("<p>{}</p>", words(50)),
        ..CreatePostRequest::default()
    }
}

/// Published post with a unique title
pub fn published(title: &str) -> CreatePostRequest {
    CreatePostRequest {
        status: Some("published".to_string()),
        ..draft(title)
    }
}

pub fn report(reason: &str) -> ReportCommentRequest {
    ReportCommentRequest {
        reason: reason.to_string(),
        description: None,
    }
}
