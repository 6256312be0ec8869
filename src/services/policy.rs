use crate::database::models::{Role, User};
use crate::services::ServiceError;

/// The acting user, as far as authorization is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self { id: user.id, role: user.role }
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), ServiceError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("Access denied. Admin privileges required.".to_string()))
    }
}

/// `message` is the full rejection text, e.g. "You are not authorized to delete this problem."
pub fn ensure_owner_or_admin(principal: &Principal, owner_id: i64, message: &str) -> Result<(), ServiceError> {
    if principal.id == owner_id || principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(message.to_string()))
    }
}

/// Admins may not act on their own account; this is a bad request, not a 403
pub fn ensure_not_self(principal: &Principal, target_id: i64, message: &str) -> Result<(), ServiceError> {
    if principal.id == target_id {
        Err(ServiceError::BadRequest(message.to_string()))
    } else {
        Ok(())
    }
}
