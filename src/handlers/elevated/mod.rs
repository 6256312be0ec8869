// handlers/elevated/mod.rs - Admin-only endpoints
//
// Routed behind jwt_auth_middleware and require_admin_middleware; the services
// re-check the role so they stay safe when called from elsewhere.
pub mod admin;
