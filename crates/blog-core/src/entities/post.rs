//! Post entity - an article that starts as a draft and may be published

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Lifecycle state of a post
///
/// `Draft -> Published` is the only transition; published is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub status: PostStatus,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub views_count: i64,
    pub likes_count: i64,
    pub bookmarks_count: i64,
    pub reading_time_minutes: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    #[inline]
    pub fn is_draft(&self) -> bool {
        self.status == PostStatus::Draft
    }

    #[inline]
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Gate for writes to a stored post: only its author, only while a draft
    ///
    /// `to` names the state the write would leave the post in.
    pub fn check_draft_write(&self, author_id: Uuid, to: &'static str) -> Result<(), DomainError> {
        if !self.is_owned_by(author_id) {
            return Err(DomainError::NotPostOwner(self.id));
        }
        if !self.is_draft() {
            return Err(DomainError::InvalidTransition {
                from: self.status.as_str(),
                to,
            });
        }
        Ok(())
    }

    /// Case-insensitive substring match on title or content
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.content.to_lowercase().contains(&term)
    }
}

/// Partial update for a post; only `Some` fields are written
///
/// Derived fields (slug, reading time, `published_at`) are filled in by the
/// caller before the update is applied, so one write carries everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub status: Option<PostStatus>,
    pub reading_time_minutes: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the columns this update touches
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.slug.is_some() {
            fields.push("slug");
        }
        if self.content.is_some() {
            fields.push("content");
        }
        if self.excerpt.is_some() {
            fields.push("excerpt");
        }
        if self.tags.is_some() {
            fields.push("tags");
        }
        if self.category.is_some() {
            fields.push("category");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.reading_time_minutes.is_some() {
            fields.push("reading_time_minutes");
        }
        if self.published_at.is_some() {
            fields.push("published_at");
        }
        fields
    }

    /// Apply the changes in place
    pub fn apply_to(&self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            post.title.clone_from(title);
        }
        if let Some(slug) = &self.slug {
            post.slug.clone_from(slug);
        }
        if let Some(content) = &self.content {
            post.content.clone_from(content);
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt.clone_from(excerpt);
        }
        if let Some(tags) = &self.tags {
            post.tags.clone_from(tags);
        }
        if let Some(category) = &self.category {
            post.category = Some(category.clone());
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(minutes) = self.reading_time_minutes {
            post.reading_time_minutes = minutes;
        }
        if let Some(at) = self.published_at {
            post.published_at = Some(at);
        }
        post.updated_at = now;
    }
}
