// handlers/protected/reviews.rs - parents review tutors they have worked with

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::review::Review;
use crate::database::repository::{ReviewRepository, StudentProfileRepository};
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::notifier;
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub tutor_id: Uuid,
    pub rate_score: f64,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rate_score: f64,
    pub description: String,
}

fn check_score(score: f64) -> Result<(), ApiError> {
    if !(1.0..=5.0).contains(&score) {
        return Err(ApiError::invalid_field("rateScore", "must be between 1 and 5"));
    }
    Ok(())
}

async fn own_review(state: &AppState, auth: &AuthUser, id: Uuid) -> Result<Review, ApiError> {
    let review = ReviewRepository::new(state.pool.clone())
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    if review.parent_id != auth.user_id {
        return Err(ApiError::forbidden("You can only change your own reviews"));
    }
    Ok(review)
}

/// POST /api/v1/reviews - One review per tutor, after teaching has started
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateReviewRequest>,
) -> ApiResult<Review> {
    auth.require_role(&[Role::Parent])?;
    check_score(body.rate_score)?;
    let description = validation::max_len("description", &body.description, 2000)?;

    let taught = StudentProfileRepository::new(state.pool.clone())
        .has_taught(auth.user_id, body.tutor_id)
        .await?;
    if !taught {
        return Err(ApiError::forbidden("You can only review tutors who have taught your child"));
    }

    let review = ReviewRepository::new(state.pool.clone())
        .insert(body.tutor_id, auth.user_id, body.rate_score, description)
        .await?;

    notifier::notify_quietly(&state, body.tutor_id, "You received a new review", Some("/tutor/reviews")).await;

    Ok(ApiResponse::created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateReviewRequest>,
) -> ApiResult<Review> {
    check_score(body.rate_score)?;
    let description = validation::max_len("description", &body.description, 2000)?;
    own_review(&state, &auth, id).await?;

    let review = ReviewRepository::new(state.pool.clone())
        .update(id, body.rate_score, description)
        .await?;
    Ok(ApiResponse::success(review))
}

/// DELETE /api/v1/reviews/:id
pub async fn delete(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    own_review(&state, &auth, id).await?;
    ReviewRepository::new(state.pool.clone()).delete(id).await?;
    Ok(ApiResponse::no_content())
}
