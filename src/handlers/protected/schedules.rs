// handlers/protected/schedules.rs - teaching slots and attendance

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::schedule::Schedule;
use crate::database::repository::{ScheduleRepository, StudentProfileRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::{AttendanceStatus, Role, StudentProfileStatus};

/// Longest range a single listing may cover
const MAX_RANGE_DAYS: i64 = 62;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub student_profile_id: Uuid,
    pub schedule_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub attendance: AttendanceStatus,
}

async fn own_slot(state: &AppState, auth: &AuthUser, id: Uuid) -> Result<Schedule, ApiError> {
    auth.require_role(&[Role::Tutor])?;
    let schedule = ScheduleRepository::new(state.pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Schedule not found"))?;
    if schedule.tutor_id != auth.user_id {
        return Err(ApiError::forbidden("You can only manage your own schedule"));
    }
    Ok(schedule)
}

/// POST /api/v1/schedules - Add a slot for a student being taught
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateScheduleRequest>,
) -> ApiResult<Schedule> {
    auth.require_role(&[Role::Tutor])?;
    if body.start_time >= body.end_time {
        return Err(ApiError::invalid_field("endTime", "must be after startTime"));
    }

    let profile = StudentProfileRepository::new(state.pool.clone())
        .find(body.student_profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found"))?;
    if profile.tutor_id != auth.user_id {
        return Err(ApiError::forbidden("You do not teach this student"));
    }
    if profile.status != StudentProfileStatus::Teaching {
        return Err(ApiError::bad_request("Schedules can only be added while teaching"));
    }

    let schedules = ScheduleRepository::new(state.pool.clone());
    let same_day = schedules.for_tutor_on(auth.user_id, body.schedule_date).await?;
    if let Some(clash) = same_day
        .iter()
        .find(|s| s.overlaps(body.schedule_date, body.start_time, body.end_time))
    {
        return Err(ApiError::conflict(format!(
            "Slot overlaps {}-{} on {}",
            clash.start_time, clash.end_time, clash.schedule_date
        )));
    }

    let schedule = schedules
        .insert(auth.user_id, profile.id, body.schedule_date, body.start_time, body.end_time)
        .await?;
    Ok(ApiResponse::created(schedule))
}

/// GET /api/v1/schedules?from=&to= - Tutor's own slots or a parent's children's slots
///
/// Defaults to the current week starting today.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<Schedule>> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let to = query.to.unwrap_or(from + Duration::days(6));
    if to < from {
        return Err(ApiError::invalid_field("to", "must not be before from"));
    }
    if (to - from).num_days() > MAX_RANGE_DAYS {
        return Err(ApiError::invalid_field("to", format!("range must not exceed {} days", MAX_RANGE_DAYS)));
    }

    let (tutor_id, parent_id) = match auth.role {
        Role::Tutor => (Some(auth.user_id), None),
        Role::Parent => (None, Some(auth.user_id)),
        _ => return Err(ApiError::forbidden("Only tutors and parents have schedules")),
    };

    let schedules = ScheduleRepository::new(state.pool.clone())
        .list_between(tutor_id, parent_id, from, to)
        .await?;
    Ok(ApiResponse::success(schedules))
}

/// PUT /api/v1/schedules/:id/attendance
pub async fn set_attendance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AttendanceRequest>,
) -> ApiResult<Schedule> {
    own_slot(&state, &auth, id).await?;
    let schedule = ScheduleRepository::new(state.pool.clone())
        .set_attendance(id, body.attendance)
        .await?;
    Ok(ApiResponse::success(schedule))
}

/// DELETE /api/v1/schedules/:id - Only slots that have not taken place
pub async fn delete(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    let schedule = own_slot(&state, &auth, id).await?;
    if schedule.attendance != AttendanceStatus::NotYet {
        return Err(ApiError::conflict("Attendance has already been recorded for this slot"));
    }
    ScheduleRepository::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}
