use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{CommentWithAuthor, ProblemStatus, ProblemWithStats, Upvote, User};
use crate::services::problem_service::ProblemDetail;

/// Public URL prefix the uploads directory is served under
pub const UPLOADS_PREFIX: &str = "/uploads";

pub fn image_url(file_name: &str) -> String {
    format!("{}/{}", UPLOADS_PREFIX, file_name)
}

/// Owner or author summary embedded in problem and comment views
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Problem as returned by list, create and status endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: ProblemStatus,
    pub user_id: i64,
    pub user: UserSummary,
    pub upvote_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProblemWithStats> for ProblemView {
    fn from(row: ProblemWithStats) -> Self {
        let problem = row.problem;
        Self {
            id: problem.id,
            image_url: problem.image.as_deref().map(image_url),
            image: problem.image,
            title: problem.title,
            description: problem.description,
            location: problem.location,
            status: problem.status,
            user_id: problem.user_id,
            user: UserSummary {
                id: problem.user_id,
                name: row.owner_name,
                email: Some(row.owner_email),
            },
            upvote_count: row.upvote_count,
            comment_count: row.comment_count,
            created_at: problem.created_at,
            updated_at: problem.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub problem_id: i64,
    pub user: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    /// Nested inside a problem detail, authors only expose id and name
    fn nested(row: CommentWithAuthor) -> Self {
        let mut view = Self::from(row);
        view.user.email = None;
        view
    }
}

impl From<CommentWithAuthor> for CommentView {
    fn from(row: CommentWithAuthor) -> Self {
        let comment = row.comment;
        Self {
            id: comment.id,
            text: comment.text,
            user_id: comment.user_id,
            problem_id: comment.problem_id,
            user: UserSummary {
                id: comment.user_id,
                name: row.author_name,
                email: Some(row.author_email),
            },
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteView {
    pub id: i64,
    pub user_id: i64,
}

impl From<Upvote> for UpvoteView {
    fn from(upvote: Upvote) -> Self {
        Self {
            id: upvote.id,
            user_id: upvote.user_id,
        }
    }
}

/// Full problem with nested comments (newest first) and upvotes
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetailView {
    #[serde(flatten)]
    pub problem: ProblemView,
    pub comments: Vec<CommentView>,
    pub upvotes: Vec<UpvoteView>,
}

impl From<ProblemDetail> for ProblemDetailView {
    fn from(detail: ProblemDetail) -> Self {
        Self {
            problem: ProblemView::from(detail.problem),
            comments: detail.comments.into_iter().map(CommentView::nested).collect(),
            upvotes: detail.upvotes.into_iter().map(UpvoteView::from).collect(),
        }
    }
}

/// `{ user, token }` payload returned by register and login
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub user: User,
    pub token: String,
}

pub fn problem_views(rows: Vec<ProblemWithStats>) -> Vec<ProblemView> {
    rows.into_iter().map(ProblemView::from).collect()
}

pub fn comment_views(rows: Vec<CommentWithAuthor>) -> Vec<CommentView> {
    rows.into_iter().map(CommentView::from).collect()
}
