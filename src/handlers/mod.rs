// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (session token required, /api/*)
pub mod public;
pub mod protected;
