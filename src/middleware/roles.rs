use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::types::Role;

fn guard(request: &Request, allowed: &[Role]) -> Result<(), ApiError> {
    request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?
        .require_role(allowed)
}

/// Staff, Manager or Admin
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    guard(&request, &[Role::Staff, Role::Manager, Role::Admin])?;
    Ok(next.run(request).await)
}

/// Manager or Admin
pub async fn require_management(request: Request, next: Next) -> Result<Response, ApiError> {
    guard(&request, &[Role::Manager, Role::Admin])?;
    Ok(next.run(request).await)
}
