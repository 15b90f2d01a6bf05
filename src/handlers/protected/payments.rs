// handlers/protected/payments.rs - tutor subscription purchases

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::payment::{PaymentHistory, PaymentHistoryView};
use crate::database::repository::PaymentRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::services::subscription;
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub package_payment_id: Uuid,
    pub amount: Decimal,
    pub transaction_id: String,
}

/// POST /api/v1/payments - Record a package purchase and extend the subscription
pub async fn purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> ApiResult<PaymentHistory> {
    auth.require_role(&[Role::Tutor])?;

    let payments = PaymentRepository::new(state.pool.clone());
    let package = payments
        .find_package(body.package_payment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Package not found"))?;
    subscription::check_purchase(&package, body.amount, &body.transaction_id)?;

    let now = Utc::now();
    let duration_months = package.duration_months;
    let history = payments
        .record_purchase(
            package.id,
            auth.user_id,
            body.amount,
            body.transaction_id.trim(),
            now,
            |latest| subscription::next_expiration(now, latest, duration_months),
        )
        .await?
        .ok_or_else(|| ApiError::internal_server_error("Package duration is invalid"))?;
    let expiration = history.expiration_date;
    tracing::info!(
        "Tutor {} bought package {}; subscription runs until {}",
        auth.user_id,
        package.id,
        expiration
    );

    Ok(ApiResponse::created(history))
}

/// GET /api/v1/payments - Own history for tutors, everyone's for management
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<PaymentHistoryView>> {
    let submitter = match auth.role {
        Role::Tutor => Some(auth.user_id),
        role if role.is_management() => None,
        _ => return Err(ApiError::forbidden("You do not have permission to perform this action")),
    };
    let page = page.resolve();
    let (rows, total) = PaymentRepository::new(state.pool.clone()).list_history(submitter, page).await?;
    Ok(ApiResponse::paged(rows, page.pagination(total)))
}
