//! Post model -> entity mapper

use blog_core::entities::{Post, PostStatus};

use crate::models::PostModel;

use super::parse_column;

impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: model.id,
            author_id: model.author_id,
            status: parse_column::<PostStatus>("posts", "status", &model.status),
            title: model.title,
            slug: model.slug,
            content: model.content,
            excerpt: model.excerpt,
            tags: model.tags,
            category: model.category,
            views_count: model.views_count,
            likes_count: model.likes_count,
            bookmarks_count: model.bookmarks_count,
            reading_time_minutes: model.reading_time_minutes,
            published_at: model.published_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
