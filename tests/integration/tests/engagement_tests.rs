//! Likes, bookmarks, views and counter reconciliation
//!
//! Run with: cargo test -p integration-tests --test engagement_tests

use chrono::Duration;
use uuid::Uuid;

use blog_common::ContentPolicy;
use blog_core::access::DenyReason;
use blog_core::entities::{CommentCounters, EngagementKind, PostCounters};
use blog_core::traits::PostRepository;
use blog_core::{Permissions, Role};
use blog_service::dto::{CreateCommentRequest, PageParams};
use blog_service::{EngagementService, LikeTarget, ServiceError};
use integration_tests::*;

async fn live_post(blog: &TestBlog) -> Uuid {
    let author = blog.user(Role::Author).await;
    blog.posts()
        .create_post(Some(author), published("Popular"))
        .await
        .unwrap()
        .id
}

// ============================================================================
// Likes
// ============================================================================

#[tokio::test]
async fn test_like_toggles_back_to_original_state() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    let liked = engagement
        .toggle_like(Some(reader), LikeTarget::Post(post_id))
        .await
        .unwrap();
    assert!(liked.active);
    assert_eq!(liked.count, 1);

    let unliked = engagement
        .toggle_like(Some(reader), LikeTarget::Post(post_id))
        .await
        .unwrap();
    assert!(!unliked.active);
    assert_eq!(unliked.count, 0);

    assert!(blog
        .store
        .engaged_users(EngagementKind::PostLike, post_id)
        .is_empty());
}

#[tokio::test]
async fn test_like_counter_never_goes_negative() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;

    // Drifted counter: the row says 0 while a like row exists
    blog.engagement()
        .toggle_like(Some(reader), LikeTarget::Post(post_id))
        .await
        .unwrap();
    blog.store
        .overwrite_post_counters(post_id, PostCounters::default());

    let outcome = blog
        .engagement()
        .toggle_like(Some(reader), LikeTarget::Post(post_id))
        .await
        .unwrap();
    assert!(!outcome.active);
    assert_eq!(outcome.count, 0);
}

#[tokio::test]
async fn test_likes_from_many_users() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;

    let mut last = 0;
    for _ in 0..3 {
        let reader = blog.user(Role::Viewer).await;
        last = blog
            .engagement()
            .toggle_like(Some(reader), LikeTarget::Post(post_id))
            .await
            .unwrap()
            .count;
    }
    assert_eq!(last, 3);
    assert_eq!(
        blog.store
            .engaged_users(EngagementKind::PostLike, post_id)
            .len(),
        3
    );
}

#[tokio::test]
async fn test_comment_likes() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;
    let comment = blog
        .comments()
        .create_comment(
            Some(reader),
            post_id,
            CreateCommentRequest {
                content: "Great read".to_string(),
            },
        )
        .await
        .unwrap();

    let outcome = blog
        .engagement()
        .toggle_like(Some(reader), LikeTarget::Comment(comment.id))
        .await
        .unwrap();
    assert!(outcome.active);
    assert_eq!(outcome.count, 1);

    assert_not_found(
        blog.engagement()
            .toggle_like(Some(reader), LikeTarget::Comment(Uuid::new_v4()))
            .await,
    );
}

#[tokio::test]
async fn test_drafts_cannot_be_liked_or_bookmarked() {
    let blog = TestBlog::new();
    let author = blog.user(Role::Author).await;
    let post = blog
        .posts()
        .create_post(Some(author), draft("Unfinished"))
        .await
        .unwrap();

    assert_not_found(
        blog.engagement()
            .toggle_like(Some(author), LikeTarget::Post(post.id))
            .await,
    );
    assert_not_found(blog.engagement().toggle_bookmark(Some(author), post.id).await);
    assert_not_found(
        blog.engagement()
            .toggle_like(Some(author), LikeTarget::Post(Uuid::new_v4()))
            .await,
    );
}

#[tokio::test]
async fn test_engagement_requires_identity() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;

    assert_eq!(
        blog.engagement()
            .toggle_like(None, LikeTarget::Post(post_id))
            .await
            .unwrap_err(),
        ServiceError::Unauthenticated
    );
    assert_eq!(
        blog.engagement()
            .toggle_bookmark(None, post_id)
            .await
            .unwrap_err(),
        ServiceError::Unauthenticated
    );
}

// ============================================================================
// Bookmarks
// ============================================================================

#[tokio::test]
async fn test_bookmarks_toggle_and_list_most_recent_first() {
    let blog = TestBlog::new();
    let first = live_post(&blog).await;
    let second = live_post(&blog).await;
    let third = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    for post_id in [first, second, third] {
        let outcome = engagement.toggle_bookmark(Some(reader), post_id).await.unwrap();
        assert!(outcome.active);
        assert_eq!(outcome.count, 1);
    }
    let removed = engagement.toggle_bookmark(Some(reader), second).await.unwrap();
    assert!(!removed.active);
    assert_eq!(removed.count, 0);

    let saved = engagement
        .list_bookmarks(Some(reader), PageParams::default())
        .await
        .unwrap();
    assert_eq!(
        saved.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![third, first]
    );
}

#[tokio::test]
async fn test_engagement_state_reflects_caller() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let fan = blog.user(Role::Viewer).await;
    let stranger = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    engagement
        .toggle_like(Some(fan), LikeTarget::Post(post_id))
        .await
        .unwrap();
    engagement.toggle_bookmark(Some(fan), post_id).await.unwrap();
    engagement
        .record_view(Some(fan), post_id, "10.0.0.1")
        .await
        .unwrap();

    let mine = engagement.get_engagement(Some(fan), post_id).await.unwrap();
    assert!(mine.liked);
    assert!(mine.bookmarked);
    assert_eq!(mine.likes_count, 1);
    assert_eq!(mine.bookmarks_count, 1);
    assert_eq!(mine.views_count, 1);

    let theirs = engagement
        .get_engagement(Some(stranger), post_id)
        .await
        .unwrap();
    assert!(!theirs.liked);
    assert!(!theirs.bookmarked);
    assert_eq!(theirs.likes_count, 1);
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn test_repeat_views_inside_window_count_once() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    let first = engagement
        .record_view(Some(reader), post_id, "10.0.0.1")
        .await
        .unwrap();
    assert!(first.counted);
    assert_eq!(first.views_count, 1);

    blog.clock.advance(Duration::minutes(10));
    let repeat = engagement
        .record_view(Some(reader), post_id, "10.0.0.1")
        .await
        .unwrap();
    assert!(!repeat.counted);
    assert_eq!(repeat.views_count, 1);

    blog.clock.advance(Duration::minutes(61));
    let later = engagement
        .record_view(Some(reader), post_id, "10.0.0.1")
        .await
        .unwrap();
    assert!(later.counted);
    assert_eq!(later.views_count, 2);

    // Every view is stored, counted or not
    assert_eq!(blog.store.views_for(post_id).len(), 3);
}

#[tokio::test]
async fn test_deleted_viewer_does_not_shadow_anonymous_visitors() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    engagement
        .record_view(Some(reader), post_id, "10.0.0.7")
        .await
        .unwrap();
    blog.users().delete_user(Some(admin), reader.user_id).await.unwrap();

    // The old row is kept with its user cleared, but it was never anonymous
    let views = blog.store.views_for(post_id);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].user_id, None);

    let visitor = engagement.record_view(None, post_id, "10.0.0.7").await.unwrap();
    assert!(visitor.counted);
    assert_eq!(visitor.views_count, 2);

    let again = engagement.record_view(None, post_id, "10.0.0.7").await.unwrap();
    assert!(!again.counted);
}

#[tokio::test]
async fn test_signed_in_views_dedup_across_addresses() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    engagement
        .record_view(Some(reader), post_id, "10.0.0.1")
        .await
        .unwrap();
    let roaming = engagement
        .record_view(Some(reader), post_id, "192.168.1.20")
        .await
        .unwrap();
    assert!(!roaming.counted);

    let other = blog.user(Role::Viewer).await;
    let someone_else = engagement
        .record_view(Some(other), post_id, "10.0.0.1")
        .await
        .unwrap();
    assert!(someone_else.counted);
    assert_eq!(someone_else.views_count, 2);
}

#[tokio::test]
async fn test_anonymous_views_dedup_by_address() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let engagement = blog.engagement();

    assert!(engagement.record_view(None, post_id, "10.0.0.1").await.unwrap().counted);
    assert!(!engagement.record_view(None, post_id, "10.0.0.1").await.unwrap().counted);
    let elsewhere = engagement.record_view(None, post_id, "10.0.0.2").await.unwrap();
    assert!(elsewhere.counted);
    assert_eq!(elsewhere.views_count, 2);
}

#[tokio::test]
async fn test_view_window_follows_policy() {
    let policy = ContentPolicy {
        view_dedup_window_secs: 60,
        ..ContentPolicy::default()
    };
    let blog = TestBlog::with_policy(policy);
    let post_id = live_post(&blog).await;

    blog.engagement()
        .record_view(None, post_id, "10.0.0.1")
        .await
        .unwrap();
    blog.clock.advance(Duration::minutes(2));
    let outcome = blog
        .engagement()
        .record_view(None, post_id, "10.0.0.1")
        .await
        .unwrap();
    assert!(outcome.counted);
}

#[tokio::test]
async fn test_views_on_unreadable_drafts_are_refused() {
    let blog = TestBlog::new();
    let author = blog.user(Role::Author).await;
    let post = blog
        .posts()
        .create_post(Some(author), draft("Sketch"))
        .await
        .unwrap();

    assert_not_found(blog.engagement().record_view(None, post.id, "10.0.0.1").await);
    assert!(blog
        .engagement()
        .record_view(Some(author), post.id, "10.0.0.1")
        .await
        .is_ok());
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_reconcile_repairs_drifted_post_counters() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let admin = blog.user(Role::Admin).await;
    let reader = blog.user(Role::Viewer).await;
    let engagement = blog.engagement();

    engagement
        .toggle_like(Some(reader), LikeTarget::Post(post_id))
        .await
        .unwrap();
    engagement.toggle_bookmark(Some(reader), post_id).await.unwrap();
    engagement
        .record_view(Some(reader), post_id, "10.0.0.1")
        .await
        .unwrap();
    engagement
        .record_view(Some(reader), post_id, "10.0.0.1")
        .await
        .unwrap();

    blog.store.overwrite_post_counters(
        post_id,
        PostCounters {
            views_count: 42,
            likes_count: -3,
            bookmarks_count: 9,
        },
    );

    let counters = engagement
        .reconcile_post_counters(Some(admin), post_id)
        .await
        .unwrap();
    assert_eq!(
        counters,
        PostCounters {
            views_count: 1,
            likes_count: 1,
            bookmarks_count: 1,
        }
    );

    let state = engagement.get_engagement(Some(reader), post_id).await.unwrap();
    assert_eq!(state.views_count, 1);
    assert_eq!(state.likes_count, 1);
    assert_eq!(state.bookmarks_count, 1);
}

#[tokio::test]
async fn test_reconcile_comment_counters() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let admin = blog.user(Role::Admin).await;
    let reader = blog.user(Role::Viewer).await;
    let comment = blog
        .comments()
        .create_comment(
            Some(reader),
            post_id,
            CreateCommentRequest {
                content: "Counted".to_string(),
            },
        )
        .await
        .unwrap();

    blog.engagement()
        .toggle_like(Some(admin), LikeTarget::Comment(comment.id))
        .await
        .unwrap();
    blog.comments()
        .report_comment(Some(admin), comment.id, report("other"))
        .await
        .unwrap();

    let counters = blog
        .engagement()
        .reconcile_comment_counters(Some(admin), comment.id)
        .await
        .unwrap();
    assert_eq!(
        counters,
        CommentCounters {
            likes_count: 1,
            report_count: 1,
        }
    );
}

#[tokio::test]
async fn test_reconcile_is_admin_only() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;

    for role in [Role::Viewer, Role::Author, Role::Editor] {
        let actor = blog.user(role).await;
        assert_forbidden(
            blog.engagement()
                .reconcile_post_counters(Some(actor), post_id)
                .await,
            DenyReason::MissingPermission(Permissions::MANAGE_SETTINGS),
        );
    }

    let admin = blog.user(Role::Admin).await;
    assert_not_found(
        blog.engagement()
            .reconcile_post_counters(Some(admin), Uuid::new_v4())
            .await,
    );
}

#[tokio::test]
async fn test_comments_under_foreign_drafts_cannot_be_liked() {
    let blog = TestBlog::new();
    let author = blog.user(Role::Author).await;
    let stranger = blog.user(Role::Viewer).await;
    let post = blog
        .posts()
        .create_post(Some(author), draft("Hidden thread"))
        .await
        .unwrap();
    let note = blog
        .comments()
        .create_comment(
            Some(author),
            post.id,
            CreateCommentRequest {
                content: "Draft note".to_string(),
            },
        )
        .await
        .unwrap();

    assert_not_found(
        blog.engagement()
            .toggle_like(Some(stranger), LikeTarget::Comment(note.id))
            .await,
    );
    assert!(blog
        .store
        .engaged_users(EngagementKind::CommentLike, note.id)
        .is_empty());

    let own = blog
        .engagement()
        .toggle_like(Some(author), LikeTarget::Comment(note.id))
        .await
        .unwrap();
    assert!(own.active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_keep_counter_in_step() {
    let blog = TestBlog::new();
    let post_id = live_post(&blog).await;
    let reader = blog.user(Role::Viewer).await;

    // Odd number of toggles from one account ends liked
    let tasks: Vec<_> = (0..15)
        .map(|_| {
            let ctx = blog.ctx.clone();
            tokio::spawn(async move {
                EngagementService::new(&ctx)
                    .toggle_like(Some(reader), LikeTarget::Post(post_id))
                    .await
            })
        })
        .collect();
    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        assert!((0..=1).contains(&outcome.count));
    }

    let likers = blog.store.engaged_users(EngagementKind::PostLike, post_id);
    assert_eq!(likers.len(), 1);
    assert!(likers.contains(&reader.user_id));

    let mut readers = Vec::new();
    for _ in 0..10 {
        readers.push(blog.user(Role::Viewer).await);
    }
    let tasks: Vec<_> = readers
        .into_iter()
        .map(|who| {
            let ctx = blog.ctx.clone();
            tokio::spawn(async move {
                EngagementService::new(&ctx)
                    .toggle_like(Some(who), LikeTarget::Post(post_id))
                    .await
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().unwrap().active);
    }

    let likers = blog.store.engaged_users(EngagementKind::PostLike, post_id);
    let post = PostRepository::find_by_id(&blog.store, post_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(likers.len(), 11);
    assert_eq!(post.likes_count, likers.len() as i64);
}
