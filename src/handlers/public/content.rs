// handlers/public/content.rs - published blogs and active packages

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::blog::Blog;
use crate::database::models::payment::PackagePayment;
use crate::database::repository::{BlogRepository, PaymentRepository};
use crate::middleware::{ApiResponse, ApiResult, PageQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogQuery {
    pub search: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl BlogQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

/// GET /api/v1/blogs - Published posts, newest first
pub async fn list_blogs(State(state): State<AppState>, Query(query): Query<BlogQuery>) -> ApiResult<Vec<Blog>> {
    let page = query.page().resolve();
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let (blogs, total) = BlogRepository::new(state.pool.clone()).list(search, true, page).await?;
    Ok(ApiResponse::paged(blogs, page.pagination(total)))
}

/// GET /api/v1/blogs/:id - Read a published post (counts a view)
pub async fn get_blog(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Blog> {
    let blog = BlogRepository::new(state.pool.clone()).view_published(id).await?;
    Ok(ApiResponse::success(blog))
}

/// GET /api/v1/packages - Subscription packages currently offered
pub async fn list_packages(State(state): State<AppState>) -> ApiResult<Vec<PackagePayment>> {
    let packages = PaymentRepository::new(state.pool.clone()).list_packages(false).await?;
    Ok(ApiResponse::success(packages))
}
