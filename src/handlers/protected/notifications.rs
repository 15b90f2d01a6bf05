// handlers/protected/notifications.rs

use axum::extract::{Path, Query, State};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::notification::Notification;
use crate::database::repository::NotificationRepository;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub unread: i64,
    pub notifications: Vec<Notification>,
}

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<NotificationPage> {
    let page = page.resolve();
    let repo = NotificationRepository::new(state.pool.clone());
    let (notifications, total) = repo.list_for(auth.user_id, page).await?;
    let unread = repo.unread_count(auth.user_id).await?;
    Ok(ApiResponse::paged(NotificationPage { unread, notifications }, page.pagination(total)))
}

/// PUT /api/v1/notifications/:id/read
pub async fn mark_read(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<Notification> {
    let notification = NotificationRepository::new(state.pool.clone())
        .mark_read(id, auth.user_id)
        .await?;
    Ok(ApiResponse::success(notification))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> ApiResult<u64> {
    let updated = NotificationRepository::new(state.pool.clone())
        .mark_all_read(auth.user_id)
        .await?;
    Ok(ApiResponse::success(updated))
}
