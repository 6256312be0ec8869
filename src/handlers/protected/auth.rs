use axum::Extension;
use serde::Serialize;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct Me {
    pub user: User,
}

/// GET /api/auth/me - The authenticated principal
pub async fn me_get(Extension(auth): Extension<AuthUser>) -> ApiResult<Me> {
    Ok(ApiResponse::success(Me { user: auth.user }))
}
