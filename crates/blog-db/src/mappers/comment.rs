//! Comment and report model -> entity mappers

use blog_core::entities::{Comment, CommentReport, CommentStatus, HiddenInfo, ReportReason};

use crate::models::{CommentModel, CommentReportModel};

use super::parse_column;

impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        let hidden = match (model.is_hidden, model.hidden_by, model.hidden_at) {
            (true, Some(hidden_by), Some(hidden_at)) => Some(HiddenInfo {
                hidden_by,
                hidden_at,
                reason: model.hidden_reason.unwrap_or_default(),
            }),
            _ => None,
        };

        Comment {
            id: model.id,
            post_id: model.post_id,
            author_id: model.author_id,
            content: model.content,
            status: parse_column::<CommentStatus>("comments", "status", &model.status),
            likes_count: model.likes_count,
            report_count: model.report_count,
            is_reported: model.is_reported,
            is_hidden: model.is_hidden,
            hidden,
            created_at: model.created_at,
        }
    }
}

impl From<CommentReportModel> for CommentReport {
    fn from(model: CommentReportModel) -> Self {
        CommentReport {
            id: model.id,
            comment_id: model.comment_id,
            reporter_id: model.reporter_id,
            reason: model
                .reason
                .parse()
                .unwrap_or_else(|_| {
                    tracing::warn!(value = %model.reason, "Unknown report reason");
                    ReportReason::Other
                }),
            description: model.description,
            created_at: model.created_at,
        }
    }
}
