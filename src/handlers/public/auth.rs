use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::api::SessionView;
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{LoginInput, RegisterInput};

/// POST /api/auth/register - Create a citizen account and receive a token
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<SessionView> {
    let Json(input) = payload?;
    let session = state.auth.register(input).await?;

    Ok(ApiResponse::created(SessionView {
        user: session.user,
        token: session.token,
    })
    .message("User registered successfully."))
}

/// POST /api/auth/login - Exchange email and password for a token
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<SessionView> {
    let Json(input) = payload?;
    let session = state.auth.login(input).await?;

    Ok(ApiResponse::success(SessionView {
        user: session.user,
        token: session.token,
    })
    .message("Login successful."))
}
