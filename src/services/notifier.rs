use uuid::Uuid;

use crate::database::models::notification::Notification;
use crate::database::repository::NotificationRepository;
use crate::database::DatabaseError;
use crate::services::hub::HubEvent;
use crate::state::AppState;

/// Persist a notification and push it to the receiver's live connections
pub async fn notify(
    state: &AppState,
    receiver_id: Uuid,
    description: &str,
    url_detail: Option<&str>,
) -> Result<Notification, DatabaseError> {
    let notification = NotificationRepository::new(state.pool.clone())
        .insert(receiver_id, description, url_detail)
        .await?;

    let delivered = state
        .hub
        .send_to_user(receiver_id, HubEvent::ReceiveNotification, &notification)
        .await;
    tracing::debug!("Notification {} pushed to {} connections", notification.id, delivered);

    Ok(notification)
}

/// Like `notify`, for side effects that must not fail the request
pub async fn notify_quietly(state: &AppState, receiver_id: Uuid, description: &str, url_detail: Option<&str>) {
    if let Err(e) = notify(state, receiver_id, description, url_detail).await {
        tracing::error!("Failed to notify user {}: {}", receiver_id, e);
    }
}
