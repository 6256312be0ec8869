use axum::extract::{rejection::PathRejection, Path, Query, State};
use serde::Serialize;

use crate::api::format::{comment_views, problem_views};
use crate::api::{CommentView, ProblemDetailView, ProblemView};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::problem_service::ListProblemsParams;

#[derive(Debug, Serialize)]
pub struct ProblemList {
    pub problems: Vec<ProblemView>,
}

#[derive(Debug, Serialize)]
pub struct ProblemShow {
    pub problem: ProblemDetailView,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<CommentView>,
}

/// GET /api/problems - Filtered, sorted list with read-time counts
///
/// Query: `status`, `location` (case-insensitive substring), `sort`
/// (createdAt | updatedAt | title | status | location), `order` (ASC | DESC).
pub async fn problem_list(
    State(state): State<AppState>,
    Query(params): Query<ListProblemsParams>,
) -> ApiResult<ProblemList> {
    let problems = problem_views(state.problems.list(&params).await?);
    let count = problems.len();

    Ok(ApiResponse::success(ProblemList { problems }).count(count))
}

/// GET /api/problems/:id - Problem with nested comments and upvotes
pub async fn problem_show(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ProblemShow> {
    let Path(id) = id?;
    let detail = state.problems.get(id).await?;

    Ok(ApiResponse::success(ProblemShow {
        problem: ProblemDetailView::from(detail),
    }))
}

/// GET /api/problems/:id/comments - Comments on a problem, newest first
pub async fn comment_list(
    State(state): State<AppState>,
    problem_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<CommentList> {
    let Path(problem_id) = problem_id?;
    let comments = comment_views(state.comments.list(problem_id).await?);
    let count = comments.len();

    Ok(ApiResponse::success(CommentList { comments }).count(count))
}
