use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::CommentView;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentEnvelope {
    pub comment: CommentView,
}

/// POST /api/problems/:id/comments - Comment on a problem
pub async fn comment_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    problem_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CommentBody>, JsonRejection>,
) -> ApiResult<CommentEnvelope> {
    let Path(problem_id) = problem_id?;
    let Json(body) = payload?;

    let comment = state.comments.add(&auth.principal(), problem_id, &body.text).await?;

    Ok(ApiResponse::created(CommentEnvelope {
        comment: CommentView::from(comment),
    })
    .message("Comment added successfully."))
}

/// DELETE /api/problems/comments/:id - Author or admin removes a comment
pub async fn comment_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.comments.delete(&auth.principal(), id).await?;

    Ok(ApiResponse::success(()).message("Comment deleted successfully."))
}
