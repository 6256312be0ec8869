pub mod admin_service;
pub mod auth_service;
pub mod comment_service;
pub mod policy;
pub mod problem_service;
pub mod upvote_service;
pub mod validation;

use crate::auth::password::PasswordError;
use crate::auth::JwtError;
use crate::database::manager::DatabaseError;
use crate::error::FieldError;
use crate::storage::StorageError;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use comment_service::CommentService;
pub use policy::Principal;
pub use problem_service::ProblemService;
pub use upvote_service::UpvoteService;

/// Failures surfaced by domain services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<FieldError> },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { message: String, field: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl ServiceError {
    /// Single-field validation failure whose message doubles as the envelope message
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ServiceError::Validation {
            errors: vec![FieldError::new(field, message.clone())],
            message,
        }
    }
}
