// handlers/elevated/dashboard.rs - management statistics

use axum::extract::{Query, State};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::database::repository::payments::PackageUsage;
use crate::database::repository::{PaymentRepository, ReportRepository, TutorRepository, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::dashboard::{self, DashboardOverview, MonthlyRevenue};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub year: Option<i32>,
}

/// GET /api/v1/admin/dashboard - Users per role, tutor requests, pending reports
pub async fn overview(State(state): State<AppState>) -> ApiResult<DashboardOverview> {
    let users = UserRepository::new(state.pool.clone());
    let tutors = TutorRepository::new(state.pool.clone());
    let reports = ReportRepository::new(state.pool.clone());
    let (by_role, by_status, pending_reports) =
        tokio::try_join!(users.count_by_role(), tutors.count_by_status(), reports.count_pending())?;
    Ok(ApiResponse::success(DashboardOverview::from_counts(
        &by_role,
        &by_status,
        pending_reports,
    )))
}

/// GET /api/v1/admin/dashboard/revenue?year= - Twelve monthly totals
pub async fn revenue(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> ApiResult<Vec<MonthlyRevenue>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let (from, to) =
        dashboard::year_bounds(year).ok_or_else(|| ApiError::invalid_field("year", "is out of range"))?;
    let payments = PaymentRepository::new(state.pool.clone()).amounts_between(from, to).await?;
    Ok(ApiResponse::success(dashboard::revenue_by_month(year, &payments)))
}

/// GET /api/v1/admin/dashboard/packages - Purchases and revenue per package
pub async fn packages(State(state): State<AppState>) -> ApiResult<Vec<PackageUsage>> {
    let usage = PaymentRepository::new(state.pool.clone()).package_usage().await?;
    Ok(ApiResponse::success(usage))
}
