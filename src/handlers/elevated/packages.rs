// handlers/elevated/packages.rs - subscription package catalogue

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::payment::PackagePayment;
use crate::database::repository::PaymentRepository;
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageRequest {
    pub title: String,
    pub duration_months: i32,
    pub price: Decimal,
    pub description: Option<String>,
}

/// POST /api/v1/admin/packages
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePackageRequest>,
) -> ApiResult<PackagePayment> {
    let title = validation::max_len("title", &body.title, 200)?;
    if body.duration_months <= 0 {
        return Err(ApiError::invalid_field("durationMonths", "must be at least one month"));
    }
    if body.price.is_sign_negative() {
        return Err(ApiError::invalid_field("price", "must not be negative"));
    }

    let package = PaymentRepository::new(state.pool.clone())
        .insert_package(title, body.duration_months, body.price, body.description.as_deref(), auth.user_id)
        .await?;
    tracing::info!("Package {} ({}) created by {}", package.id, package.title, auth.user_id);
    Ok(ApiResponse::created(package))
}

/// GET /api/v1/admin/packages - Includes deactivated packages
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PackagePayment>> {
    let packages = PaymentRepository::new(state.pool.clone()).list_packages(true).await?;
    Ok(ApiResponse::success(packages))
}

/// DELETE /api/v1/admin/packages/:id - Deactivate; purchase history keeps referencing it
pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<PackagePayment> {
    let package = PaymentRepository::new(state.pool.clone())
        .set_package_active(id, false)
        .await?;
    tracing::info!("Package {} deactivated by {}", id, auth.user_id);
    Ok(ApiResponse::success(package))
}
