// handlers/public/appeals.rs - POST /api/v1/reports/unlock handler

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::database::models::report::{NewReport, Report};
use crate::database::repository::{ReportRepository, UserRepository};
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::ReportType;

#[derive(Debug, Deserialize)]
pub struct UnlockAppealRequest {
    pub email: String,
    pub description: String,
}

/// POST /api/v1/reports/unlock - Locked users ask staff to unlock their account
pub async fn unlock_appeal(State(state): State<AppState>, Json(body): Json<UnlockAppealRequest>) -> ApiResult<Report> {
    let email = validation::email(&body.email)?;
    let description = validation::max_len("description", &body.description, 2000)?.to_string();

    let user = UserRepository::new(state.pool.clone())
        .find_by_email(&email)
        .await?
        .filter(|u| u.is_locked_out)
        .ok_or_else(|| ApiError::bad_request("No locked account exists for this email"))?;

    let reports = ReportRepository::new(state.pool.clone());
    if reports.has_pending_unlock(&email).await? {
        return Err(ApiError::conflict("An unlock request for this account is already pending"));
    }

    let report = reports
        .insert(NewReport {
            report_type: ReportType::UnlockAccount,
            description,
            reporter_id: Some(user.id),
            reporter_email: user.email,
            tutor_id: None,
            review_id: None,
        })
        .await?;
    tracing::info!("Unlock appeal {} filed for user {}", report.id, user.id);

    Ok(ApiResponse::created(report))
}
