use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode, Uri},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::api::format::UPLOADS_PREFIX;
use crate::config::{AppConfig, Environment};
use crate::database::Repositories;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::services::{AdminService, AuthService, CommentService, ProblemService, UpvoteService};
use crate::storage::ImageStore;

/// Multipart framing allowance on top of the image size limit
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub images: Arc<dyn ImageStore>,
    pub auth: AuthService,
    pub problems: ProblemService,
    pub comments: CommentService,
    pub upvotes: UpvoteService,
    pub admin: AdminService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, repos: Repositories, images: Arc<dyn ImageStore>) -> Self {
        let problems = ProblemService::new(repos.clone(), images.clone(), config.uploads.max_file_size_bytes);
        Self {
            auth: AuthService::new(repos.clone(), config.clone()),
            comments: CommentService::new(repos.clone()),
            upvotes: UpvoteService::new(repos.clone()),
            admin: AdminService::new(repos.clone(), problems.clone()),
            problems,
            config,
            repos,
            images,
        }
    }
}

/// Full application router
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_file_size_bytes + FORM_OVERHEAD_BYTES;
    let uploads = ServeDir::new(state.images.root());

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes(&state))
        .nest_service(UPLOADS_PREFIX, uploads)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        // Token acquisition
        .route("/api/auth/register", post(public::auth::register_post))
        .route("/api/auth/login", post(public::auth::login_post))
        // Read-only problem browsing
        .route("/api/problems", get(public::problems::problem_list))
        .route("/api/problems/:id", get(public::problems::problem_show))
        .route("/api/problems/:id/comments", get(public::problems::comment_list))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(protected::auth::me_get))
        .route("/api/problems", post(protected::problems::problem_create))
        .route("/api/problems/:id", delete(protected::problems::problem_delete))
        .route("/api/problems/:id/status", put(protected::problems::problem_status_put))
        .route("/api/problems/:id/comments", post(protected::comments::comment_create))
        .route("/api/problems/comments/:id", delete(protected::comments::comment_delete))
        .route("/api/problems/:id/upvote", post(protected::upvotes::upvote_toggle))
        .route("/api/problems/:id/upvote/status", get(protected::upvotes::upvote_status))
        .merge(admin_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// Admin tier; the JWT layer is applied by the enclosing protected router
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(elevated::admin::users_list))
        .route("/api/admin/users/:id", delete(elevated::admin::user_delete))
        .route("/api/admin/users/:id/block", put(elevated::admin::user_block_put))
        .route("/api/admin/problems", get(elevated::admin::problems_list))
        .route("/api/admin/problems/:id", delete(elevated::admin::problem_delete))
        .route_layer(from_fn(require_admin_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.environment == Environment::Development || config.security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "CivicPulse API",
            "version": version,
            "description": "Municipal issue reporting and triage",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/register, /api/auth/login (public), /api/auth/me (protected)",
                "problems": "/api/problems[/:id] (public read, protected write)",
                "comments": "/api/problems/:id/comments (public read, protected write)",
                "upvotes": "/api/problems/:id/upvote[/status] (protected)",
                "admin": "/api/admin/* (admin)",
                "uploads": "/uploads/:file (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.repos.maintenance.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

async fn not_found(uri: Uri) -> ApiError {
    debug!("No route for {}", uri.path());
    ApiError::not_found("Route not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalImageStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn test_app(dir: &std::path::Path) -> Router {
        let config = Arc::new(AppConfig::for_tests(dir));
        let images = LocalImageStore::open(dir).await.unwrap();
        app(AppState::new(config, Repositories::memory(), Arc::new(images)))
    }

    async fn call(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn public_and_protected_methods_share_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_app(dir.path()).await;

        let (status, body) = call(router.clone(), Method::GET, "/api/problems/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Problem not found.");

        let (status, body) = call(router, Method::DELETE, "/api/problems/1").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access denied. No token provided.");
    }

    #[tokio::test]
    async fn admin_routes_check_token_first() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_app(dir.path()).await;

        let (status, _) = call(router, Method::GET, "/api/admin/users").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_routes_use_the_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_app(dir.path()).await;

        let (status, body) = call(router, Method::GET, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Route not found", "code": "NOT_FOUND" }));
    }
}
