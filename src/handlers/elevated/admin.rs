use axum::{
    extract::{rejection::PathRejection, Path, State},
    Extension,
};
use serde::Serialize;

use crate::api::format::problem_views;
use crate::api::ProblemView;
use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProblemList {
    pub problems: Vec<ProblemView>,
}

/// GET /api/admin/users
pub async fn users_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<UserList> {
    let users = state.admin.list_users(&auth.principal()).await?;
    let count = users.len();

    Ok(ApiResponse::success(UserList { users }).count(count))
}

/// PUT /api/admin/users/:id/block - Flip the blocked flag
pub async fn user_block_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<UserEnvelope> {
    let Path(id) = id?;
    let user = state.admin.toggle_block(&auth.principal(), id).await?;
    let verb = if user.is_blocked { "blocked" } else { "unblocked" };

    Ok(ApiResponse::success(UserEnvelope { user }).message(format!("User {} successfully.", verb)))
}

/// DELETE /api/admin/users/:id - Remove a user and everything they own
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.admin.delete_user(&auth.principal(), id).await?;

    Ok(ApiResponse::success(()).message("User deleted successfully."))
}

/// GET /api/admin/problems - Every problem, newest first
pub async fn problems_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<ProblemList> {
    let problems = problem_views(state.admin.list_problems(&auth.principal()).await?);
    let count = problems.len();

    Ok(ApiResponse::success(ProblemList { problems }).count(count))
}

/// DELETE /api/admin/problems/:id
pub async fn problem_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.admin.delete_problem(&auth.principal(), id).await?;

    Ok(ApiResponse::success(()).message("Problem deleted successfully."))
}
