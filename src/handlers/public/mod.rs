// handlers/public/mod.rs - Endpoints that need no bearer token
//
// Token acquisition plus read-only browsing of problems and their comments.
pub mod auth;
pub mod problems;
