// handlers/elevated/tutor_requests.rs - tutor registration review

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::tutor::{Tutor, TutorSummary};
use crate::database::repository::TutorRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::services::{email, notifier};
use crate::state::AppState;
use crate::types::RequestStatus;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub status: Option<RequestStatus>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub status: RequestStatus,
}

/// GET /api/v1/admin/tutor-requests?status=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Vec<TutorSummary>> {
    let page = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .resolve();
    let (requests, total) = TutorRepository::new(state.pool.clone())
        .list_requests(query.status, page)
        .await?;
    Ok(ApiResponse::paged(requests, page.pagination(total)))
}

/// PUT /api/v1/admin/tutor-requests/:id - Approve or reject a pending tutor
pub async fn decide(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tutor_id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> ApiResult<Tutor> {
    if body.status == RequestStatus::Pending {
        return Err(ApiError::invalid_field("status", "must be Approve or Reject"));
    }

    let tutors = TutorRepository::new(state.pool.clone());
    let summary = tutors
        .summary(tutor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tutor request not found"))?;
    let tutor = tutors
        .decide_request(tutor_id, body.status)
        .await?
        .ok_or_else(|| ApiError::conflict(format!("Tutor request has already been handled ({})", summary.request_status)))?;
    tracing::info!("Tutor request {} set to {} by {}", tutor_id, tutor.request_status, auth.user_id);

    email::deliver(
        state.mailer.as_ref(),
        email::tutor_request_decided(&summary.email, &summary.full_name, tutor.request_status),
    )
    .await;
    notifier::notify_quietly(
        &state,
        tutor_id,
        &format!("Your tutor registration was {}", tutor.request_status),
        None,
    )
    .await;

    Ok(ApiResponse::success(tutor))
}
