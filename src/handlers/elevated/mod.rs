// handlers/elevated/mod.rs - Staff and management handlers
//
// Mounted behind jwt_auth_middleware, validate_user_middleware and one of
// require_staff / require_management. Admin-only operations check the role
// inside the handler.
pub mod assessments;
pub mod blogs;
pub mod dashboard;
pub mod packages;
pub mod reports;
pub mod tutor_requests;
pub mod users;
