// handlers/protected/student_profiles.rs - tutor-created child profiles with initial assessment

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::assessment::{
    AnswerInput, QuestionWithOptions, StudentProfile, StudentProfileDetail,
};
use crate::database::repository::student_profiles::ProfileFilter;
use crate::database::repository::{AssessmentRepository, StudentProfileRepository, UserRepository};
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{assessment, notifier};
use crate::state::AppState;
use crate::types::{Role, StudentProfileStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub parent_email: String,
    pub child_name: String,
    pub birth_date: NaiveDate,
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub status: Option<StudentProfileStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: StudentProfileStatus,
}

/// GET /api/v1/assessments - Questions and options for the initial assessment
pub async fn list_questions(State(state): State<AppState>) -> ApiResult<Vec<QuestionWithOptions>> {
    let questions = AssessmentRepository::new(state.pool.clone()).list_questions().await?;
    Ok(ApiResponse::success(questions))
}

/// POST /api/v1/student-profiles - Tutor proposes a profile to a parent
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateProfileRequest>,
) -> ApiResult<StudentProfile> {
    auth.require_role(&[Role::Tutor])?;
    let parent_email = validation::email(&body.parent_email)?;
    let child_name = validation::max_len("childName", &body.child_name, 100)?;
    if body.birth_date > Utc::now().date_naive() {
        return Err(ApiError::invalid_field("birthDate", "must not be in the future"));
    }
    if body.answers.is_empty() {
        return Err(ApiError::invalid_field("answers", "the initial assessment is required"));
    }

    let parent = UserRepository::new(state.pool.clone())
        .find_by_email(&parent_email)
        .await?
        .filter(|u| u.role == Role::Parent)
        .ok_or_else(|| ApiError::not_found("No parent account exists for this email"))?;

    let option_ids: Vec<Uuid> = body.answers.iter().map(|a| a.option_id).collect();
    let options = AssessmentRepository::new(state.pool.clone())
        .options_by_ids(&option_ids)
        .await?;
    let total_point = assessment::score_answers(&body.answers, &options)?;

    let profile = StudentProfileRepository::new(state.pool.clone())
        .insert(auth.user_id, parent.id, child_name, body.birth_date, total_point, &body.answers)
        .await?;
    tracing::info!("Tutor {} created student profile {} for parent {}", auth.user_id, profile.id, parent.id);

    notifier::notify_quietly(
        &state,
        parent.id,
        &format!("A tutor created a learning profile for {}", profile.child_name),
        Some(&format!("/student-profiles/{}", profile.id)),
    )
    .await;

    Ok(ApiResponse::created(profile))
}

/// GET /api/v1/student-profiles - Tutor's or parent's profiles; staff see all
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Vec<StudentProfile>> {
    let mut filter = ProfileFilter {
        status: query.status,
        ..Default::default()
    };
    match auth.role {
        Role::Tutor => filter.tutor_id = Some(auth.user_id),
        Role::Parent => filter.parent_id = Some(auth.user_id),
        _ => {}
    }
    let profiles = StudentProfileRepository::new(state.pool.clone()).list(filter).await?;
    Ok(ApiResponse::success(profiles))
}

async fn visible_profile(state: &AppState, auth: &AuthUser, id: Uuid) -> Result<StudentProfile, ApiError> {
    let profile = StudentProfileRepository::new(state.pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found"))?;
    let allowed = profile.tutor_id == auth.user_id || profile.parent_id == auth.user_id || auth.role.is_staff();
    if !allowed {
        return Err(ApiError::forbidden("You cannot view this student profile"));
    }
    Ok(profile)
}

/// GET /api/v1/student-profiles/:id - Profile with its assessment answers
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StudentProfileDetail> {
    let profile = visible_profile(&state, &auth, id).await?;
    let assessment_results = StudentProfileRepository::new(state.pool.clone()).results(id).await?;
    Ok(ApiResponse::success(StudentProfileDetail {
        profile,
        assessment_results,
    }))
}

/// PUT /api/v1/student-profiles/:id/status
///
/// Parents accept (`Teaching`) or reject a pending profile; tutors stop a
/// profile they are teaching.
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> ApiResult<StudentProfile> {
    let profile = visible_profile(&state, &auth, id).await?;
    let next = body.status;

    let actor_allowed = match next {
        StudentProfileStatus::Teaching | StudentProfileStatus::Reject => profile.parent_id == auth.user_id,
        StudentProfileStatus::Stop => profile.tutor_id == auth.user_id,
        StudentProfileStatus::Pending => false,
    };
    if !actor_allowed {
        return Err(ApiError::forbidden("You cannot make this change to the student profile"));
    }
    if !profile.status.can_transition_to(next) {
        return Err(ApiError::conflict(format!(
            "Student profile cannot move from {} to {}",
            profile.status, next
        )));
    }

    let updated = StudentProfileRepository::new(state.pool.clone())
        .transition(id, profile.status, next)
        .await?
        .ok_or_else(|| ApiError::conflict("Student profile was changed by another request"))?;

    let receiver = if auth.user_id == updated.parent_id { updated.tutor_id } else { updated.parent_id };
    notifier::notify_quietly(
        &state,
        receiver,
        &format!("Student profile for {} is now {}", updated.child_name, updated.status),
        Some(&format!("/student-profiles/{}", updated.id)),
    )
    .await;

    Ok(ApiResponse::success(updated))
}
