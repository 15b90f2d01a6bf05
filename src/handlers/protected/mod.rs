// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Routes here run behind jwt_auth_middleware and validate_user_middleware.
// Role checks that depend on the resource are made inside each handler.
pub mod conversations;
pub mod notifications;
pub mod payments;
pub mod reports;
pub mod reviews;
pub mod schedules;
pub mod student_profiles;
pub mod tutor_profile;
pub mod users;
