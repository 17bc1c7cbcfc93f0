//! Account management and analytics integration tests
//!
//! Run with: cargo test -p integration-tests --test user_tests

use uuid::Uuid;

use blog_core::access::DenyReason;
use blog_core::{Identity, Permissions, Role};
use blog_service::dto::{
    CreateCommentRequest, PageParams, RegisterUserRequest, UpdateUserRequest,
};
use blog_service::{LikeTarget, ServiceError};
use integration_tests::*;

fn registration(email: &str, name: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        email: email.to_string(),
        name: name.to_string(),
    }
}

fn promote(role: &str) -> UpdateUserRequest {
    UpdateUserRequest {
        role: Some(role.to_string()),
        ..UpdateUserRequest::default()
    }
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_creates_active_viewer() {
    let blog = TestBlog::new();

    let user = blog
        .users()
        .register_user(registration("  Ada@Example.COM ", " Ada "))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.name, "Ada");
    assert_eq!(user.role, Role::Viewer);
    assert!(user.is_active);

    assert_forbidden(
        blog.posts()
            .create_post(Some(Identity::new(user.id)), draft("Too soon"))
            .await,
        DenyReason::MissingPermission(Permissions::CREATE_POSTS),
    );
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let blog = TestBlog::new();
    blog.users()
        .register_user(registration("grace@example.com", "Grace"))
        .await
        .unwrap();

    assert_conflict(
        blog.users()
            .register_user(registration("GRACE@example.com", "Grace Again"))
            .await,
    );
    assert_invalid(
        blog.users()
            .register_user(registration("not-an-email", "Nobody"))
            .await,
        "email",
    );
    assert_invalid(
        blog.users()
            .register_user(registration("blank@example.com", "   "))
            .await,
        "name",
    );
}

// ============================================================================
// Role and status changes
// ============================================================================

#[tokio::test]
async fn test_admin_promotes_viewer_to_author() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let member = blog.user(Role::Viewer).await;

    let updated = blog
        .users()
        .update_user_role_or_status(Some(admin), member.user_id, promote("author"))
        .await
        .unwrap();
    assert_eq!(updated.role, Role::Author);

    // The new role applies on the very next call
    assert!(blog
        .posts()
        .create_post(Some(member), draft("Debut"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_claimed_role_is_not_trusted() {
    let blog = TestBlog::new();
    let viewer = blog.user(Role::Viewer).await;

    let pretender = Identity::with_claimed_role(viewer.user_id, Role::Admin);
    assert_forbidden(
        blog.users().list_users(Some(pretender), PageParams::default()).await,
        DenyReason::MissingPermission(Permissions::MANAGE_USERS),
    );
}

#[tokio::test]
async fn test_only_admins_manage_users() {
    let blog = TestBlog::new();
    let target = blog.user(Role::Viewer).await;

    for role in [Role::Viewer, Role::Author, Role::Editor] {
        let actor = blog.user(role).await;
        assert_forbidden(
            blog.users()
                .update_user_role_or_status(Some(actor), target.user_id, promote("admin"))
                .await,
            DenyReason::MissingPermission(Permissions::MANAGE_USERS),
        );
        assert_forbidden(
            blog.users().delete_user(Some(actor), target.user_id).await,
            DenyReason::MissingPermission(Permissions::MANAGE_USERS),
        );
    }
}

#[tokio::test]
async fn test_admins_cannot_lock_themselves_out() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let users = blog.users();

    assert_forbidden(
        users
            .update_user_role_or_status(Some(admin), admin.user_id, promote("editor"))
            .await,
        DenyReason::SelfDemotion,
    );
    assert_forbidden(
        users
            .update_user_role_or_status(
                Some(admin),
                admin.user_id,
                UpdateUserRequest {
                    is_active: Some(false),
                    ..UpdateUserRequest::default()
                },
            )
            .await,
        DenyReason::SelfDeactivation,
    );
    assert_forbidden(
        users.delete_user(Some(admin), admin.user_id).await,
        DenyReason::SelfDeletion,
    );

    let renamed = users
        .update_user_role_or_status(
            Some(admin),
            admin.user_id,
            UpdateUserRequest {
                name: Some("Head Admin".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Head Admin");
    assert_eq!(renamed.role, Role::Admin);
}

#[tokio::test]
async fn test_deactivated_accounts_are_refused() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let author = blog.user(Role::Author).await;

    let updated = blog
        .users()
        .update_user_role_or_status(
            Some(admin),
            author.user_id,
            UpdateUserRequest {
                is_active: Some(false),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.is_active);

    assert_forbidden(
        blog.posts().create_post(Some(author), draft("Locked out")).await,
        DenyReason::AccountInactive,
    );
}

#[tokio::test]
async fn test_update_rejects_unknown_role_and_missing_target() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let member = blog.user(Role::Viewer).await;

    assert_invalid(
        blog.users()
            .update_user_role_or_status(Some(admin), member.user_id, promote("superuser"))
            .await,
        "role",
    );
    assert_not_found(
        blog.users()
            .update_user_role_or_status(Some(admin), Uuid::new_v4(), promote("author"))
            .await,
    );
    assert_not_found(blog.users().get_user(Some(admin), Uuid::new_v4()).await);
}

#[tokio::test]
async fn test_unknown_identity_is_unauthenticated() {
    let blog = TestBlog::new();

    assert_eq!(
        blog.users()
            .list_users(Some(Identity::new(Uuid::new_v4())), PageParams::default())
            .await
            .unwrap_err(),
        ServiceError::Unauthenticated
    );
}

#[tokio::test]
async fn test_list_users_paginates() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    for _ in 0..4 {
        blog.user(Role::Viewer).await;
    }

    let page = blog
        .users()
        .list_users(
            Some(admin),
            PageParams {
                page: Some(2),
                per_page: Some(2),
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn test_delete_user_removes_their_content() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let author = blog.user(Role::Author).await;
    let post = blog
        .posts()
        .create_post(Some(author), published("Soon gone"))
        .await
        .unwrap();

    blog.users().delete_user(Some(admin), author.user_id).await.unwrap();

    assert_not_found(blog.posts().get_post_by_slug(None, &post.slug).await);
    assert_not_found(blog.users().get_user(Some(admin), author.user_id).await);
    assert_eq!(
        blog.posts()
            .create_post(Some(author), draft("Ghost"))
            .await
            .unwrap_err(),
        ServiceError::Unauthenticated
    );
    assert_not_found(blog.users().delete_user(Some(admin), author.user_id).await);
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn test_content_stats() {
    let blog = TestBlog::new();
    let admin = blog.user(Role::Admin).await;
    let author = blog.user(Role::Author).await;
    let reader = blog.user(Role::Viewer).await;

    let live = blog
        .posts()
        .create_post(Some(author), published("Counted"))
        .await
        .unwrap();
    blog.posts()
        .create_post(Some(author), draft("Pending"))
        .await
        .unwrap();
    blog.engagement()
        .toggle_like(Some(reader), LikeTarget::Post(live.id))
        .await
        .unwrap();
    blog.engagement()
        .record_view(Some(reader), live.id, "10.0.0.1")
        .await
        .unwrap();
    let comment = blog
        .comments()
        .create_comment(
            Some(reader),
            live.id,
            CreateCommentRequest {
                content: "Nice".to_string(),
            },
        )
        .await
        .unwrap();
    blog.comments()
        .report_comment(Some(author), comment.id, report("spam"))
        .await
        .unwrap();

    let stats = blog.analytics().content_stats(Some(admin)).await.unwrap();
    assert_eq!(stats.total_posts, 2);
    assert_eq!(stats.published_posts, 1);
    assert_eq!(stats.draft_posts, 1);
    assert_eq!(stats.total_views, 1);
    assert_eq!(stats.total_likes, 1);
    assert_eq!(stats.total_comments, 1);
    assert_eq!(stats.reported_comments, 1);
    assert_eq!(stats.hidden_comments, 0);
}

#[tokio::test]
async fn test_content_stats_needs_view_analytics() {
    let blog = TestBlog::new();

    for role in [Role::Viewer, Role::Author] {
        let actor = blog.user(role).await;
        assert_forbidden(
            blog.analytics().content_stats(Some(actor)).await,
            DenyReason::MissingPermission(Permissions::VIEW_ANALYTICS),
        );
    }

    let editor = blog.user(Role::Editor).await;
    assert!(blog.analytics().content_stats(Some(editor)).await.is_ok());
}
