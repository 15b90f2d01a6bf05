pub mod auth;
pub mod response;
pub mod roles;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult, PageQuery, Pagination};
pub use roles::{require_management, require_staff};
pub use validate_user::{load_active_user, validate_user_middleware, ValidatedUser};
