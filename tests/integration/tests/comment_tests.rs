//! Comment and moderation integration tests
//!
//! Run with: cargo test -p integration-tests --test comment_tests

use chrono::Duration;
use uuid::Uuid;

use blog_core::access::DenyReason;
use blog_core::entities::{ModerationFilter, ReportReason, MAX_COMMENT_LENGTH};
use blog_core::traits::Clock;
use blog_core::{Identity, Permissions, Role};
use blog_service::dto::{
    CommentResponse, CreateCommentRequest, HideCommentRequest, ModerationListQuery,
    ReportCommentRequest,
};
use blog_service::{CommentService, ServiceError};
use integration_tests::*;

fn say(content: &str) -> CreateCommentRequest {
    CreateCommentRequest {
        content: content.to_string(),
    }
}

fn hide(reason: &str) -> HideCommentRequest {
    HideCommentRequest {
        reason: reason.to_string(),
    }
}

async fn live_post(blog: &TestBlog) -> Uuid {
    let author = blog.user(Role::Author).await;
    blog.posts()
        .create_post(Some(author), published("Discussed"))
        .await
        .unwrap()
        .id
}

async fn comment_on(blog: &TestBlog, post_id: Uuid, who: Identity, text: &str) -> CommentResponse {
    blog.comments()
        .create_comment(Some(who), post_id, say(text))
        .await
        .unwrap()
}

// ============================================================================
// Creating comments
// ============================================================================

#[tokio::test]
async fn test_any_signed_in_user_can_comment_on_published_post() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let viewer = blog.user(Role::Viewer).await;

    let comment = comment_on(&blog, post_id, viewer, "First!").await;

    assert_eq!(comment.author_id, viewer.user_id);
    assert_eq!(comment.post_id, post_id);
    assert_eq!(comment.report_count, 0);
    assert!(!comment.is_reported);
    assert!(!comment.is_hidden);
    assert_eq!(comment.created_at, blog.clock.now());
}

#[tokio::test]
async fn test_comment_requires_identity() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;

    assert_eq!(
        blog.comments()
            .create_comment(None, post_id, say("hi"))
            .await
            .unwrap_err(),
        ServiceError::Unauthenticated
    );
}

#[tokio::test]
async fn test_comment_content_limits() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let viewer = blog.user(Role::Viewer).await;

    let at_limit = "a".repeat(MAX_COMMENT_LENGTH);
    assert!(blog
        .comments()
        .create_comment(Some(viewer), post_id, say(&at_limit))
        .await
        .is_ok());

    let too_long = "a".repeat(MAX_COMMENT_LENGTH + 1);
    assert_invalid(
        blog.comments()
            .create_comment(Some(viewer), post_id, say(&too_long))
            .await,
        "content",
    );
    assert_invalid(
        blog.comments()
            .create_comment(Some(viewer), post_id, say("   "))
            .await,
        "content",
    );
}

#[tokio::test]
async fn test_comment_on_missing_or_unreadable_post() {
    let blog = TestBlog::new();
    let viewer = blog.user(Role::Viewer).await;
    let author = blog.user(Role::Author).await;
    let hidden_draft = blog
        .posts()
        .create_post(Some(author), draft("Private"))
        .await
        .unwrap();

    assert_not_found(
        blog.comments()
            .create_comment(Some(viewer), Uuid::new_v4(), say("hello?"))
            .await,
    );
    assert_not_found(
        blog.comments()
            .create_comment(Some(viewer), hidden_draft.id, say("hello?"))
            .await,
    );
    assert!(blog
        .comments()
        .create_comment(Some(author), hidden_draft.id, say("note to self"))
        .await
        .is_ok());
}

// ============================================================================
// Reports and moderation
// ============================================================================

#[tokio::test]
async fn test_report_hide_unhide_lifecycle() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let reporter = blog.user(Role::Viewer).await;
    let editor = blog.user(Role::Editor).await;
    let comment = comment_on(&blog, post_id, writer, "Buy cheap watches").await;

    let reported = blog
        .comments()
        .report_comment(Some(reporter), comment.id, report("spam"))
        .await
        .unwrap();
    assert!(reported.is_reported);
    assert_eq!(reported.report_count, 1);

    assert_conflict(
        blog.comments()
            .report_comment(Some(reporter), comment.id, report("offensive"))
            .await,
    );

    blog.clock.advance(Duration::minutes(3));
    let hidden = blog
        .comments()
        .hide_comment(Some(editor), comment.id, hide("abusive"))
        .await
        .unwrap();
    assert!(hidden.is_hidden);
    assert_eq!(hidden.report_count, 1);
    assert_eq!(hidden.hidden_by, Some(editor.user_id));
    assert_eq!(hidden.hidden_at, Some(blog.clock.now()));
    assert_eq!(hidden.hidden_reason.as_deref(), Some("abusive"));

    let restored = blog
        .comments()
        .unhide_comment(Some(editor), comment.id)
        .await
        .unwrap();
    assert!(!restored.is_hidden);
    assert!(restored.hidden_by.is_none());
    assert!(restored.hidden_at.is_none());
    assert!(restored.hidden_reason.is_none());
    assert!(restored.is_reported);
    assert_eq!(restored.report_count, 1);
}

#[tokio::test]
async fn test_reports_from_different_users_accumulate() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let comment = comment_on(&blog, post_id, writer, "Hot take").await;

    for reason in ["spam", "harassment", "other"] {
        let reporter = blog.user(Role::Viewer).await;
        blog.comments()
            .report_comment(Some(reporter), comment.id, report(reason))
            .await
            .unwrap();
    }

    let editor = blog.user(Role::Editor).await;
    let reports = blog
        .comments()
        .list_reports_for_comment(Some(editor), comment.id)
        .await
        .unwrap();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().any(|r| r.reason == ReportReason::Harassment));
    assert!(reports.iter().all(|r| r.comment_id == comment.id));
}

#[tokio::test]
async fn test_report_payload_is_checked() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let reporter = blog.user(Role::Viewer).await;
    let comment = comment_on(&blog, post_id, writer, "Meh").await;

    assert_invalid(
        blog.comments()
            .report_comment(Some(reporter), comment.id, report("  "))
            .await,
        "reason",
    );
    assert_invalid(
        blog.comments()
            .report_comment(Some(reporter), comment.id, report("boring"))
            .await,
        "reason",
    );
    assert_not_found(
        blog.comments()
            .report_comment(Some(reporter), Uuid::new_v4(), report("spam"))
            .await,
    );

    let with_details = ReportCommentRequest {
        reason: " spam ".to_string(),
        description: Some("link farm".to_string()),
    };
    let reported = blog
        .comments()
        .report_comment(Some(reporter), comment.id, with_details)
        .await
        .unwrap();
    assert_eq!(reported.report_count, 1);
}

#[tokio::test]
async fn test_moderation_needs_permission() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let viewer = blog.user(Role::Viewer).await;
    let author = blog.user(Role::Author).await;
    let comment = comment_on(&blog, post_id, viewer, "Hello").await;

    for actor in [viewer, author] {
        assert_forbidden(
            blog.comments()
                .hide_comment(Some(actor), comment.id, hide("nope"))
                .await,
            DenyReason::MissingPermission(Permissions::MODERATE_COMMENTS),
        );
        assert_forbidden(
            blog.comments().delete_comment(Some(actor), comment.id).await,
            DenyReason::MissingPermission(Permissions::DELETE_COMMENTS),
        );
        assert_forbidden(
            blog.comments()
                .list_comments_for_moderation(Some(actor), ModerationListQuery::default())
                .await,
            DenyReason::MissingPermission(Permissions::MODERATE_COMMENTS),
        );
    }

    let editor = blog.user(Role::Editor).await;
    assert_invalid(
        blog.comments()
            .hide_comment(Some(editor), comment.id, hide(" "))
            .await,
        "reason",
    );
    assert_not_found(
        blog.comments()
            .hide_comment(Some(editor), Uuid::new_v4(), hide("gone"))
            .await,
    );
}

#[tokio::test]
async fn test_hidden_comments_leave_public_listing() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let editor = blog.user(Role::Editor).await;

    let kept = comment_on(&blog, post_id, writer, "Thoughtful").await;
    blog.clock.advance(Duration::seconds(30));
    let removed = comment_on(&blog, post_id, writer, "Rude").await;
    blog.comments()
        .hide_comment(Some(editor), removed.id, hide("rude"))
        .await
        .unwrap();

    let public = blog
        .comments()
        .list_comments_for_post(None, post_id, false)
        .await
        .unwrap();
    assert_eq!(public.iter().map(|c| c.id).collect::<Vec<_>>(), vec![kept.id]);

    let everything = blog
        .comments()
        .list_comments_for_post(Some(editor), post_id, true)
        .await
        .unwrap();
    assert_eq!(
        everything.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![kept.id, removed.id]
    );

    assert_forbidden(
        blog.comments()
            .list_comments_for_post(Some(writer), post_id, true)
            .await,
        DenyReason::MissingPermission(Permissions::MODERATE_COMMENTS),
    );
    assert_eq!(
        blog.comments()
            .list_comments_for_post(None, post_id, true)
            .await
            .unwrap_err(),
        ServiceError::Unauthenticated
    );
}

#[tokio::test]
async fn test_moderation_queue_order_and_filters() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let editor = blog.user(Role::Editor).await;

    let quiet = comment_on(&blog, post_id, writer, "Quiet").await;
    blog.clock.advance(Duration::minutes(1));
    let once = comment_on(&blog, post_id, writer, "Reported once").await;
    blog.clock.advance(Duration::minutes(1));
    let twice = comment_on(&blog, post_id, writer, "Reported twice").await;
    blog.clock.advance(Duration::minutes(1));
    let hidden = comment_on(&blog, post_id, writer, "Hidden").await;

    for (target, reporters) in [(once.id, 1), (twice.id, 2), (hidden.id, 3)] {
        for _ in 0..reporters {
            let reporter = blog.user(Role::Viewer).await;
            blog.comments()
                .report_comment(Some(reporter), target, report("spam"))
                .await
                .unwrap();
        }
    }
    blog.comments()
        .hide_comment(Some(editor), hidden.id, hide("spam"))
        .await
        .unwrap();

    let ids = |page: blog_service::dto::PaginatedResponse<CommentResponse>| {
        page.items.into_iter().map(|c| c.id).collect::<Vec<_>>()
    };
    let query = |filter| ModerationListQuery {
        filter,
        ..ModerationListQuery::default()
    };

    let reported = blog
        .comments()
        .list_comments_for_moderation(Some(editor), query(ModerationFilter::Reported))
        .await
        .unwrap();
    assert_eq!(reported.total, 2);
    assert_eq!(ids(reported), vec![twice.id, once.id]);

    let hidden_only = blog
        .comments()
        .list_comments_for_moderation(Some(editor), query(ModerationFilter::Hidden))
        .await
        .unwrap();
    assert_eq!(ids(hidden_only), vec![hidden.id]);

    let all = blog
        .comments()
        .list_comments_for_moderation(Some(editor), query(ModerationFilter::All))
        .await
        .unwrap();
    assert_eq!(ids(all), vec![twice.id, once.id, hidden.id, quiet.id]);
}

#[tokio::test]
async fn test_editor_deletes_comment_with_its_reports() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let reporter = blog.user(Role::Viewer).await;
    let editor = blog.user(Role::Editor).await;
    let comment = comment_on(&blog, post_id, writer, "Doomed").await;
    blog.comments()
        .report_comment(Some(reporter), comment.id, report("spam"))
        .await
        .unwrap();

    blog.comments()
        .delete_comment(Some(editor), comment.id)
        .await
        .unwrap();

    assert!(blog
        .comments()
        .list_comments_for_post(None, post_id, false)
        .await
        .unwrap()
        .is_empty());
    assert_not_found(
        blog.comments()
            .list_reports_for_comment(Some(editor), comment.id)
            .await,
    );
    assert_not_found(blog.comments().delete_comment(Some(editor), comment.id).await);
}

#[tokio::test]
async fn test_comments_under_foreign_drafts_cannot_be_reported() {
    let blog = TestBlog::new();
    let author = blog.user(Role::Author).await;
    let stranger = blog.user(Role::Viewer).await;
    let editor = blog.user(Role::Editor).await;
    let post = blog
        .posts()
        .create_post(Some(author), draft("Work in progress"))
        .await
        .unwrap();
    let note = comment_on(&blog, post.id, author, "Remember the intro").await;

    assert_not_found(
        blog.comments()
            .report_comment(Some(stranger), note.id, report("spam"))
            .await,
    );

    // Holders of read_drafts can see the draft and its comments
    let reported = blog
        .comments()
        .report_comment(Some(editor), note.id, report("other"))
        .await
        .unwrap();
    assert_eq!(reported.report_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_duplicate_reports_count_once() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let writer = blog.user(Role::Viewer).await;
    let reporter = blog.user(Role::Viewer).await;
    let editor = blog.user(Role::Editor).await;
    let comment_id = comment_on(&blog, post_id, writer, "Contested").await.id;

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let ctx = blog.ctx.clone();
            tokio::spawn(async move {
                CommentService::new(&ctx)
                    .report_comment(Some(reporter), comment_id, report("spam"))
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(reported) => {
                accepted += 1;
                assert_eq!(reported.report_count, 1);
            }
            Err(ServiceError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(accepted, 1);

    let reports = blog
        .comments()
        .list_reports_for_comment(Some(editor), comment_id)
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);

    let stored = blog
        .comments()
        .list_comments_for_post(None, post_id, false)
        .await
        .unwrap();
    assert_eq!(stored[0].report_count, 1);
}
