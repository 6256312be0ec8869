use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Extension,
};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::upvote_service::UpvoteState;

/// POST /api/problems/:id/upvote - Toggle the caller's upvote
///
/// 201 when this call created the upvote, 200 otherwise.
pub async fn upvote_toggle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    problem_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<UpvoteState> {
    let Path(problem_id) = problem_id?;
    let outcome = state.upvotes.toggle(&auth.principal(), problem_id).await?;

    let response = match (outcome.created, outcome.state.upvoted) {
        (true, _) => ApiResponse::with_status(outcome.state, StatusCode::CREATED).message("Problem upvoted successfully."),
        (false, false) => ApiResponse::success(outcome.state).message("Upvote removed successfully."),
        (false, true) => ApiResponse::success(outcome.state).message("Problem already upvoted."),
    };
    Ok(response)
}

/// GET /api/problems/:id/upvote/status - Whether the caller has upvoted
pub async fn upvote_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    problem_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<UpvoteState> {
    let Path(problem_id) = problem_id?;
    let current = state.upvotes.status(&auth.principal(), problem_id).await?;

    Ok(ApiResponse::success(current))
}
