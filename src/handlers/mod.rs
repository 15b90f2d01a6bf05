// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (JWT + user validation) → Elevated (staff/management roles)
pub mod elevated;
pub mod hub;
pub mod protected;
pub mod public;
pub mod validation;
