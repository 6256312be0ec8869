// handlers/mod.rs - Three security tiers
//
// Public (no auth) → Protected (bearer JWT) → Elevated (bearer JWT + admin role)
pub mod elevated;
pub mod protected;
pub mod public;
