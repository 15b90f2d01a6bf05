// handlers/elevated/blogs.rs - blog authoring

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::blog::{Blog, BlogInput};
use crate::database::repository::BlogRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuery {
    pub search: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

fn check_input(input: &BlogInput) -> Result<(), ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::invalid_field("title", "is required"));
    }
    if input.title.chars().count() > 200 {
        return Err(ApiError::invalid_field("title", "must be at most 200 characters"));
    }
    if input.content.trim().is_empty() {
        return Err(ApiError::invalid_field("content", "is required"));
    }
    Ok(())
}

/// GET /api/v1/admin/blogs - All posts including drafts
pub async fn list(State(state): State<AppState>, Query(query): Query<DraftQuery>) -> ApiResult<Vec<Blog>> {
    let page = PageQuery {
        page_number: query.page_number,
        page_size: query.page_size,
    }
    .resolve();
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let (blogs, total) = BlogRepository::new(state.pool.clone()).list(search, false, page).await?;
    Ok(ApiResponse::paged(blogs, page.pagination(total)))
}

/// GET /api/v1/admin/blogs/:id - Read without counting a view
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Blog> {
    let blog = BlogRepository::new(state.pool.clone()).get(id).await?;
    Ok(ApiResponse::success(blog))
}

/// POST /api/v1/admin/blogs
pub async fn create(State(state): State<AppState>, auth: AuthUser, Json(body): Json<BlogInput>) -> ApiResult<Blog> {
    check_input(&body)?;
    let blog = BlogRepository::new(state.pool.clone()).insert(auth.user_id, &body).await?;
    tracing::info!("Blog {} created by {}", blog.id, auth.user_id);
    Ok(ApiResponse::created(blog))
}

/// PUT /api/v1/admin/blogs/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<BlogInput>,
) -> ApiResult<Blog> {
    check_input(&body)?;
    let blog = BlogRepository::new(state.pool.clone()).update(id, &body).await?;
    Ok(ApiResponse::success(blog))
}

/// DELETE /api/v1/admin/blogs/:id
pub async fn delete(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<()> {
    BlogRepository::new(state.pool.clone()).delete(id).await?;
    tracing::info!("Blog {} deleted by {}", id, auth.user_id);
    Ok(ApiResponse::no_content())
}
