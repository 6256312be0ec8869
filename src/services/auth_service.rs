use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::{generate_jwt, validate_jwt, JwtError};
use crate::config::AppConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Role, User};
use crate::database::repository::Repositories;
use crate::services::validation::{normalize_email, Validator};
use crate::services::ServiceError;

pub const BLOCKED_MESSAGE: &str = "Your account has been blocked. Please contact admin.";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A user together with a freshly issued bearer token
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Account creation, login and bearer-token resolution
#[derive(Clone)]
pub struct AuthService {
    repos: Repositories,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(repos: Repositories, config: Arc<AppConfig>) -> Self {
        Self { repos, config }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<Session, ServiceError> {
        let user = self.create_user(&input.name, &input.email, &input.password, Role::User).await?;
        let token = generate_jwt(&self.config.security, user.id)?;
        info!("Registered user {}", user.id);
        Ok(Session { user, token })
    }

    pub async fn login(&self, input: LoginInput) -> Result<Session, ServiceError> {
        let mut v = Validator::new();
        v.email("email", &input.email);
        if input.password.is_empty() {
            v.push("password", "Password is required");
        }
        v.finish()?;

        let email = normalize_email(&input.email);
        let invalid = || ServiceError::Unauthorized("Invalid email or password.".to_string());

        let user = self.repos.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !verify_password_blocking(input.password, user.password_hash.clone()).await? {
            warn!("Failed login for user {}", user.id);
            return Err(invalid());
        }
        if user.is_blocked {
            warn!("Blocked user {} attempted login", user.id);
            return Err(ServiceError::Forbidden(BLOCKED_MESSAGE.to_string()));
        }

        let token = generate_jwt(&self.config.security, user.id)?;
        Ok(Session { user, token })
    }

    /// Resolve a bearer token to a live, unblocked user
    pub async fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let claims = validate_jwt(&self.config.security, token).map_err(|e| match e {
            JwtError::Expired => ServiceError::Unauthorized("Token expired.".to_string()),
            JwtError::Invalid(reason) => {
                debug!("Rejected token: {}", reason);
                ServiceError::Unauthorized("Invalid token.".to_string())
            }
            other => ServiceError::Jwt(other),
        })?;

        let user = self
            .repos
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid token. User not found.".to_string()))?;

        if user.is_blocked {
            return Err(ServiceError::Forbidden(BLOCKED_MESSAGE.to_string()));
        }
        Ok(user)
    }

    /// Validate, hash and insert. The only place a plaintext password becomes a hash on create.
    pub async fn create_user(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User, ServiceError> {
        let mut v = Validator::new();
        v.length("name", "Name", name, 2, 100).email("email", email);
        check_password(&mut v, password);
        v.finish()?;

        let email = normalize_email(email);
        let password_hash = hash_password_blocking(password.to_string()).await?;
        let new_user = NewUser {
            name: name.trim().to_string(),
            email,
            password_hash,
            role,
        };

        match self.repos.users.create(new_user).await {
            Ok(user) => Ok(user),
            Err(DatabaseError::UniqueViolation { .. }) => Err(ServiceError::Conflict {
                message: "User with this email already exists.".to_string(),
                field: "email".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_password(&self, user_id: i64, password: &str) -> Result<User, ServiceError> {
        let mut v = Validator::new();
        check_password(&mut v, password);
        v.finish()?;

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let user = self
            .repos
            .users
            .update_password(user_id, &password_hash)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found.".to_string()))?;
        info!("Password updated for user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.repos
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found.".to_string()))
    }

    pub async fn set_role(&self, user_id: i64, role: Role) -> Result<User, ServiceError> {
        self.repos
            .users
            .set_role(user_id, role)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found.".to_string()))
    }
}

fn check_password(v: &mut Validator, password: &str) {
    let len = password.chars().count();
    if len == 0 {
        v.push("password", "Password is required");
    } else if !(6..=255).contains(&len) {
        v.push("password", "Password must be between 6 and 255 characters");
    }
}
