// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, the tutor directory, published content and unlock appeals.
pub mod appeals;
pub mod auth;
pub mod content;
pub mod tutors;
