// handlers/elevated/assessments.rs - initial assessment questions

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::assessment::{NewOption, QuestionWithOptions};
use crate::database::repository::AssessmentRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::assessment;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub question: String,
    pub options: Vec<NewOption>,
}

/// POST /api/v1/admin/assessments
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateQuestionRequest>,
) -> ApiResult<QuestionWithOptions> {
    assessment::check_question(&body.question, &body.options)?;
    let question = body.question.trim();

    let assessments = AssessmentRepository::new(state.pool.clone());
    if assessments.question_exists(question).await? {
        return Err(ApiError::conflict("This question already exists"));
    }
    let created = assessments.insert_question(question, &body.options, auth.user_id).await?;
    tracing::info!("Assessment question {} created by {}", created.question.id, auth.user_id);

    Ok(ApiResponse::created(created))
}

/// DELETE /api/v1/admin/assessments/:id
pub async fn delete(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    AssessmentRepository::new(state.pool.clone()).delete_question(id).await?;
    tracing::info!("Assessment question {} deleted by {}", id, auth.user_id);
    Ok(ApiResponse::no_content())
}
