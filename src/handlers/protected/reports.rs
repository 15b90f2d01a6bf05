// handlers/protected/reports.rs - complaints filed by parents

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::report::{NewReport, Report};
use crate::database::repository::reports::ReportFilter;
use crate::database::repository::{ReportRepository, ReviewRepository, TutorRepository};
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::state::AppState;
use crate::types::{ReportType, Role};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub report_type: ReportType,
    pub description: String,
    pub tutor_id: Option<Uuid>,
    pub review_id: Option<Uuid>,
}

/// POST /api/v1/reports - File a tutor or review complaint
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateReportRequest>,
) -> ApiResult<Report> {
    auth.require_role(&[Role::Parent])?;
    let description = validation::max_len("description", &body.description, 2000)?.to_string();

    let (tutor_id, review_id) = match body.report_type {
        ReportType::TutorComplaint => {
            let tutor_id = body
                .tutor_id
                .ok_or_else(|| ApiError::invalid_field("tutorId", "is required for tutor complaints"))?;
            TutorRepository::new(state.pool.clone())
                .find(tutor_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Tutor not found"))?;
            (Some(tutor_id), None)
        }
        ReportType::ReviewComplaint => {
            let review_id = body
                .review_id
                .ok_or_else(|| ApiError::invalid_field("reviewId", "is required for review complaints"))?;
            let review = ReviewRepository::new(state.pool.clone())
                .find(review_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Review not found"))?;
            (Some(review.tutor_id), Some(review_id))
        }
        ReportType::UnlockAccount => {
            return Err(ApiError::invalid_field("reportType", "unlock requests use /reports/unlock"));
        }
    };

    let report = ReportRepository::new(state.pool.clone())
        .insert(NewReport {
            report_type: body.report_type,
            description,
            reporter_id: Some(auth.user_id),
            reporter_email: auth.email.clone(),
            tutor_id,
            review_id,
        })
        .await?;
    tracing::info!("Report {} ({}) filed by {}", report.id, report.report_type, auth.user_id);

    Ok(ApiResponse::created(report))
}

/// GET /api/v1/reports/mine - Reports the parent has filed
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Report>> {
    let page = page.resolve();
    let filter = ReportFilter {
        reporter_id: Some(auth.user_id),
        ..Default::default()
    };
    let (reports, total) = ReportRepository::new(state.pool.clone()).list(filter, page).await?;
    Ok(ApiResponse::paged(reports, page.pagination(total)))
}
