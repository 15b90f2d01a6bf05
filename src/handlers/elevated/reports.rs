// handlers/elevated/reports.rs - moderation queue

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::report::Report;
use crate::database::repository::reports::ReportFilter;
use crate::database::repository::ReportRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::services::moderation;
use crate::state::AppState;
use crate::types::{ReportType, RequestStatus};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub report_type: Option<ReportType>,
    pub status: Option<RequestStatus>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub status: RequestStatus,
    pub comment: Option<String>,
}

/// GET /api/v1/admin/reports?reportType=&status=
pub async fn list(State(state): State<AppState>, Query(query): Query<ReportListQuery>) -> ApiResult<Vec<Report>> {
    let page = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .resolve();
    let filter = ReportFilter {
        report_type: query.report_type,
        status: query.status,
        reporter_id: None,
    };
    let (reports, total) = ReportRepository::new(state.pool.clone()).list(filter, page).await?;
    Ok(ApiResponse::paged(reports, page.pagination(total)))
}

/// GET /api/v1/admin/reports/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Report> {
    let report = ReportRepository::new(state.pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;
    Ok(ApiResponse::success(report))
}

/// PUT /api/v1/admin/reports/:id - Approve or reject a pending report
pub async fn decide(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> ApiResult<Report> {
    let comment = body.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let report = moderation::decide_report(&state, id, body.status, auth.user_id, comment).await?;
    Ok(ApiResponse::success(report))
}
