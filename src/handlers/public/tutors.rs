// handlers/public/tutors.rs - tutor directory

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::review::{ReviewStats, ReviewView};
use crate::database::models::tutor::TutorSummary;
use crate::database::repository::tutors::TutorFilter;
use crate::database::repository::{ReviewRepository, TutorRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, PageQuery};
use crate::services::tutor_search;
use crate::state::AppState;
use crate::types::RequestStatus;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorSearchQuery {
    pub search: Option<String>,
    pub age_from: Option<i32>,
    pub age_to: Option<i32>,
    pub review_score: Option<u8>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl TutorSearchQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorReviews {
    pub stats: ReviewStats,
    pub reviews: Vec<ReviewView>,
}

/// GET /api/v1/tutors - Search approved tutors, ranked by review score
pub async fn list(State(state): State<AppState>, Query(query): Query<TutorSearchQuery>) -> ApiResult<Vec<TutorSummary>> {
    if let Some(score) = query.review_score {
        if !(1..=5).contains(&score) {
            return Err(ApiError::invalid_field("reviewScore", "must be between 1 and 5"));
        }
    }
    if let (Some(from), Some(to)) = (query.age_from, query.age_to) {
        if from > to {
            return Err(ApiError::invalid_field("ageTo", "must not be below ageFrom"));
        }
    }

    let page = query.page().resolve();
    let filter = TutorFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        age_from: query.age_from,
        age_to: query.age_to,
    };
    let candidates = TutorRepository::new(state.pool.clone()).search_approved(&filter).await?;
    let ranked = tutor_search::rank(candidates, query.review_score, config::config().tutor_search.min_results);

    let total = ranked.len() as i64;
    Ok(ApiResponse::paged(page.slice(ranked), page.pagination(total)))
}

/// GET /api/v1/tutors/:id - Public profile of an approved tutor
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<TutorSummary> {
    let tutor = TutorRepository::new(state.pool.clone())
        .summary(id)
        .await?
        .filter(|t| t.request_status == RequestStatus::Approve)
        .ok_or_else(|| ApiError::not_found("Tutor not found"))?;
    Ok(ApiResponse::success(tutor))
}

/// GET /api/v1/tutors/:id/reviews - Visible reviews with average and count
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<TutorReviews> {
    let page = page.resolve();
    let repo = ReviewRepository::new(state.pool.clone());
    let stats = repo.stats_for_tutor(id).await?;
    let (reviews, total) = repo.list_visible_for_tutor(id, page).await?;
    Ok(ApiResponse::paged(TutorReviews { stats, reviews }, page.pagination(total)))
}
