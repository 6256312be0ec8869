// handlers/protected/mod.rs - Endpoints behind jwt_auth_middleware
//
// Every handler here receives the resolved `AuthUser` as a request extension.
// Blocked accounts never reach this tier.
pub mod auth;
pub mod comments;
pub mod problems;
pub mod upvotes;
