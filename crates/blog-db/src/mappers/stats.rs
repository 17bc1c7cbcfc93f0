//! Content stats model -> entity mapper

use blog_core::entities::ContentStats;

use crate::models::ContentStatsModel;

impl From<ContentStatsModel> for ContentStats {
    fn from(model: ContentStatsModel) -> Self {
        ContentStats {
            total_posts: model.total_posts,
            published_posts: model.published_posts,
            draft_posts: model.draft_posts,
            total_views: model.total_views,
            total_likes: model.total_likes,
            total_comments: model.total_comments,
            reported_comments: model.reported_comments,
            hidden_comments: model.hidden_comments,
        }
    }
}
