//! In-memory repository implementations
//!
//! One `MemoryStore` implements every repository trait over a single
//! mutex-guarded state. Each trait method holds the lock for its whole body,
//! so compound operations (toggle, report, view) are atomic exactly like the
//! transactional PostgreSQL versions. Used by service tests and local runs
//! without a database.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use blog_core::entities::{
    floored_decrement, moderation_order, Comment, CommentCounters, CommentReport, ContentStats,
    EngagementKind, HiddenInfo, ModerationFilter, Post, PostChanges, PostCounters, PostStatus, PostView,
    ToggleOutcome, User, UserChanges, ViewOutcome,
};
use blog_core::error::DomainError;
use blog_core::traits::{
    AnalyticsRepository, CommentRepository, EngagementRepository, ModerationQuery, PostQuery,
    PostRepository, PostSort, RepoResult, UserRepository,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    reports: Vec<CommentReport>,
    /// (kind, target, user) -> insertion sequence
    toggles: HashMap<(EngagementKind, Uuid, Uuid), u64>,
    views: Vec<PostView>,
    next_seq: u64,
}

impl MemoryState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn target_exists(&self, kind: EngagementKind, target_id: Uuid) -> bool {
        if kind.targets_post() {
            self.posts.contains_key(&target_id)
        } else {
            self.comments.contains_key(&target_id)
        }
    }

    fn counter_mut(&mut self, kind: EngagementKind, target_id: Uuid) -> Option<&mut i64> {
        match kind {
            EngagementKind::PostLike => self.posts.get_mut(&target_id).map(|p| &mut p.likes_count),
            EngagementKind::PostBookmark => self
                .posts
                .get_mut(&target_id)
                .map(|p| &mut p.bookmarks_count),
            EngagementKind::CommentLike => self
                .comments
                .get_mut(&target_id)
                .map(|c| &mut c.likes_count),
        }
    }

    fn count_toggles(&self, kind: EngagementKind, target_id: Uuid) -> i64 {
        self.toggles
            .keys()
            .filter(|(k, t, _)| *k == kind && *t == target_id)
            .count() as i64
    }

    fn remove_comment(&mut self, id: Uuid) {
        self.comments.remove(&id);
        self.reports.retain(|r| r.comment_id != id);
        self.toggles
            .retain(|(k, t, _), _| !(*k == EngagementKind::CommentLike && *t == id));
    }

    fn remove_post(&mut self, id: Uuid) {
        self.posts.remove(&id);
        let comment_ids: Vec<Uuid> = self
            .comments
            .values()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in comment_ids {
            self.remove_comment(comment_id);
        }
        self.toggles.retain(|(k, t, _), _| !(k.targets_post() && *t == id));
        self.views.retain(|v| v.post_id != id);
    }

    fn remove_user(&mut self, id: Uuid) {
        self.users.remove(&id);
        let post_ids: Vec<Uuid> = self
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in post_ids {
            self.remove_post(post_id);
        }
        let comment_ids: Vec<Uuid> = self
            .comments
            .values()
            .filter(|c| c.author_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in comment_ids {
            self.remove_comment(comment_id);
        }
        self.reports.retain(|r| r.reporter_id != id);
        self.toggles.retain(|(_, _, u), _| *u != id);
        for view in &mut self.views {
            if view.user_id == Some(id) {
                view.user_id = None;
            }
        }
        for comment in self.comments.values_mut() {
            if comment.hidden.as_ref().is_some_and(|h| h.hidden_by == id) {
                // Mirrors ON DELETE SET NULL on hidden_by: the row loses its
                // moderator reference and with it the hidden metadata.
                comment.hidden = None;
            }
        }
    }
}

fn sort_posts(posts: &mut [Post], sort: PostSort) {
    let newest = |a: &Post, b: &Post| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id));
    posts.sort_by(|a, b| match sort {
        PostSort::Newest => newest(a, b),
        PostSort::Oldest => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
        PostSort::MostViewed => b.views_count.cmp(&a.views_count).then_with(|| newest(a, b)),
        PostSort::MostLiked => b.likes_count.cmp(&a.likes_count).then_with(|| newest(a, b)),
        PostSort::Title => a.title.cmp(&b.title).then(a.id.cmp(&b.id)),
    });
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

/// In-memory store implementing every repository trait
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every view ever recorded for a post, counted or not
    pub fn views_for(&self, post_id: Uuid) -> Vec<PostView> {
        self.state
            .lock()
            .views
            .iter()
            .filter(|v| v.post_id == post_id)
            .cloned()
            .collect()
    }

    /// Overwrite a post's stored counters without touching the detail rows
    pub fn overwrite_post_counters(&self, post_id: Uuid, counters: PostCounters) {
        if let Some(post) = self.state.lock().posts.get_mut(&post_id) {
            post.views_count = counters.views_count;
            post.likes_count = counters.likes_count;
            post.bookmarks_count = counters.bookmarks_count;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.state.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self.state.lock().users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(page(users, limit, offset))
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.state.lock().users.len() as i64)
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
        now: DateTime<Utc>,
    ) -> RepoResult<User> {
        let mut state = self.state.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        changes.apply_to(user, now);
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let mut state = self.state.lock();
        if !state.users.contains_key(&id) {
            return Err(DomainError::UserNotFound(id));
        }
        state.remove_user(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Post>> {
        Ok(self.state.lock().posts.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        Ok(self
            .state
            .lock()
            .posts
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, except: Option<Uuid>) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except))
    }

    async fn create(&self, post: &Post) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.posts.values().any(|p| p.slug == post.slug) {
            return Err(DomainError::SlugAlreadyExists(post.slug.clone()));
        }
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update_draft(
        &self,
        id: Uuid,
        author_id: Uuid,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> RepoResult<Post> {
        let mut state = self.state.lock();
        if let Some(slug) = &changes.slug {
            if state.posts.values().any(|p| &p.slug == slug && p.id != id) {
                return Err(DomainError::SlugAlreadyExists(slug.clone()));
            }
        }
        let post = state
            .posts
            .get_mut(&id)
            .ok_or_else(|| DomainError::PostNotFound(id.to_string()))?;
        let to = changes.status.unwrap_or(PostStatus::Draft).as_str();
        post.check_draft_write(author_id, to)?;
        changes.apply_to(post, now);
        Ok(post.clone())
    }

    async fn delete_draft(&self, id: Uuid, author_id: Uuid) -> RepoResult<()> {
        let mut state = self.state.lock();
        state
            .posts
            .get(&id)
            .ok_or_else(|| DomainError::PostNotFound(id.to_string()))?
            .check_draft_write(author_id, "deleted")?;
        state.remove_post(id);
        Ok(())
    }

    async fn list(&self, query: &PostQuery) -> RepoResult<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .state
            .lock()
            .posts
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        sort_posts(&mut posts, query.sort);
        Ok(page(posts, query.limit, query.offset))
    }

    async fn count(&self, query: &PostQuery) -> RepoResult<i64> {
        Ok(self
            .state
            .lock()
            .posts
            .values()
            .filter(|p| query.matches(p))
            .count() as i64)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        Ok(self.state.lock().comments.get(&id).cloned())
    }

    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut state = self.state.lock();
        if !state.posts.contains_key(&comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id.to_string()));
        }
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        let mut state = self.state.lock();
        if !state.comments.contains_key(&id) {
            return Err(DomainError::CommentNotFound(id));
        }
        state.remove_comment(id);
        Ok(())
    }

    async fn list_for_post(&self, post_id: Uuid, include_hidden: bool) -> RepoResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .state
            .lock()
            .comments
            .values()
            .filter(|c| c.post_id == post_id && (include_hidden || !c.is_hidden))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn list_for_moderation(&self, query: &ModerationQuery) -> RepoResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .state
            .lock()
            .comments
            .values()
            .filter(|c| query.filter.matches(c))
            .cloned()
            .collect();
        comments.sort_by(|a, b| match moderation_order(a, b) {
            Ordering::Equal => b.id.cmp(&a.id),
            other => other,
        });
        Ok(page(comments, query.limit, query.offset))
    }

    async fn count_for_moderation(&self, filter: ModerationFilter) -> RepoResult<i64> {
        Ok(self
            .state
            .lock()
            .comments
            .values()
            .filter(|c| filter.matches(c))
            .count() as i64)
    }

    async fn report(&self, report: &CommentReport) -> RepoResult<Comment> {
        let mut state = self.state.lock();
        if !state.comments.contains_key(&report.comment_id) {
            return Err(DomainError::CommentNotFound(report.comment_id));
        }
        if state
            .reports
            .iter()
            .any(|r| r.comment_id == report.comment_id && r.reporter_id == report.reporter_id)
        {
            return Err(DomainError::DuplicateReport);
        }
        state.reports.push(report.clone());

        let comment = state
            .comments
            .get_mut(&report.comment_id)
            .ok_or(DomainError::CommentNotFound(report.comment_id))?;
        comment.register_report();
        Ok(comment.clone())
    }

    async fn reports_for(&self, comment_id: Uuid) -> RepoResult<Vec<CommentReport>> {
        let mut reports: Vec<CommentReport> = self
            .state
            .lock()
            .reports
            .iter()
            .filter(|r| r.comment_id == comment_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reports)
    }

    async fn hide(&self, id: Uuid, info: &HiddenInfo) -> RepoResult<Comment> {
        let mut state = self.state.lock();
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or(DomainError::CommentNotFound(id))?;
        comment.hide(info.hidden_by, info.reason.clone(), info.hidden_at);
        Ok(comment.clone())
    }

    async fn unhide(&self, id: Uuid) -> RepoResult<Comment> {
        let mut state = self.state.lock();
        let comment = state
            .comments
            .get_mut(&id)
            .ok_or(DomainError::CommentNotFound(id))?;
        comment.unhide();
        Ok(comment.clone())
    }
}

#[async_trait]
impl EngagementRepository for MemoryStore {
    async fn toggle(
        &self,
        kind: EngagementKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<ToggleOutcome> {
        let mut state = self.state.lock();
        if !state.target_exists(kind, target_id) {
            return Err(if kind.targets_post() {
                DomainError::PostNotFound(target_id.to_string())
            } else {
                DomainError::CommentNotFound(target_id)
            });
        }

        let key = (kind, target_id, user_id);
        let active = if state.toggles.remove(&key).is_some() {
            false
        } else {
            let seq = state.next_seq();
            state.toggles.insert(key, seq);
            true
        };

        let counter = state
            .counter_mut(kind, target_id)
            .ok_or_else(|| DomainError::InternalError("toggle target vanished".to_string()))?;
        *counter = if active {
            *counter + 1
        } else {
            floored_decrement(*counter)
        };

        Ok(ToggleOutcome {
            active,
            count: *counter,
        })
    }

    async fn is_active(
        &self,
        kind: EngagementKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .toggles
            .contains_key(&(kind, target_id, user_id)))
    }

    async fn record_view(&self, view: PostView, window: Duration) -> RepoResult<ViewOutcome> {
        let mut state = self.state.lock();
        if !state.posts.contains_key(&view.post_id) {
            return Err(DomainError::PostNotFound(view.post_id.to_string()));
        }

        let cutoff = view.viewed_at - window;
        let seen_recently = state.views.iter().any(|v| {
            v.post_id == view.post_id
                && v.counted
                && v.viewed_at > cutoff
                && v.same_viewer(view.user_id, &view.ip_address)
        });
        let counted = !seen_recently;
        let post_id = view.post_id;
        state.views.push(PostView { counted, ..view });

        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| DomainError::PostNotFound(post_id.to_string()))?;
        if counted {
            post.views_count += 1;
        }

        Ok(ViewOutcome {
            counted,
            views_count: post.views_count,
        })
    }

    async fn bookmarked_posts(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Post>> {
        let state = self.state.lock();
        let mut marks: Vec<(u64, Uuid)> = state
            .toggles
            .iter()
            .filter(|((k, _, u), _)| *k == EngagementKind::PostBookmark && *u == user_id)
            .map(|((_, post_id, _), seq)| (*seq, *post_id))
            .collect();
        marks.sort_by(|a, b| b.0.cmp(&a.0));

        let posts: Vec<Post> = marks
            .into_iter()
            .filter_map(|(_, post_id)| state.posts.get(&post_id).cloned())
            .collect();
        Ok(page(posts, limit, offset))
    }

    async fn recount_post(&self, post_id: Uuid) -> RepoResult<PostCounters> {
        let mut state = self.state.lock();
        let counters = PostCounters {
            views_count: state
                .views
                .iter()
                .filter(|v| v.post_id == post_id && v.counted)
                .count() as i64,
            likes_count: state.count_toggles(EngagementKind::PostLike, post_id),
            bookmarks_count: state.count_toggles(EngagementKind::PostBookmark, post_id),
        };

        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| DomainError::PostNotFound(post_id.to_string()))?;
        post.views_count = counters.views_count;
        post.likes_count = counters.likes_count;
        post.bookmarks_count = counters.bookmarks_count;
        Ok(counters)
    }

    async fn recount_comment(&self, comment_id: Uuid) -> RepoResult<CommentCounters> {
        let mut state = self.state.lock();
        let counters = CommentCounters {
            likes_count: state.count_toggles(EngagementKind::CommentLike, comment_id),
            report_count: state
                .reports
                .iter()
                .filter(|r| r.comment_id == comment_id)
                .count() as i64,
        };

        let comment = state
            .comments
            .get_mut(&comment_id)
            .ok_or(DomainError::CommentNotFound(comment_id))?;
        comment.likes_count = counters.likes_count;
        comment.report_count = counters.report_count;
        comment.is_reported = comment.is_reported || counters.report_count > 0;
        Ok(counters)
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn content_stats(&self) -> RepoResult<ContentStats> {
        let state = self.state.lock();
        let published = state.posts.values().filter(|p| p.is_published()).count() as i64;
        let total_posts = state.posts.len() as i64;

        Ok(ContentStats {
            total_posts,
            published_posts: published,
            draft_posts: total_posts - published,
            total_views: state.posts.values().map(|p| p.views_count).sum(),
            total_likes: state.posts.values().map(|p| p.likes_count).sum(),
            total_comments: state.comments.len() as i64,
            reported_comments: state.comments.values().filter(|c| c.is_reported).count() as i64,
            hidden_comments: state.comments.values().filter(|c| c.is_hidden).count() as i64,
        })
    }
}

impl MemoryStore {
    /// Users holding an active toggle of `kind` on a target
    pub fn engaged_users(&self, kind: EngagementKind, target_id: Uuid) -> HashSet<Uuid> {
        self.state
            .lock()
            .toggles
            .keys()
            .filter(|(k, t, _)| *k == kind && *t == target_id)
            .map(|(_, _, u)| *u)
            .collect()
    }
}
