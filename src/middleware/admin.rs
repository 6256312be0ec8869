use axum::{extract::Request, middleware::Next, response::Response, Extension};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::policy;

/// Runs after `jwt_auth_middleware`; rejects any principal without the admin role
pub async fn require_admin_middleware(
    Extension(auth): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    policy::require_admin(&auth.principal()).map_err(|e| {
        warn!("User {} denied admin route {}", auth.id(), request.uri().path());
        ApiError::from(e)
    })?;

    Ok(next.run(request).await)
}
