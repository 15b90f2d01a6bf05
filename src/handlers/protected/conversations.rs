// handlers/protected/conversations.rs - parent/tutor messaging

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::messaging::{Conversation, ConversationView, Message};
use crate::database::repository::{MessagingRepository, TutorRepository};
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::services::HubEvent;
use crate::state::AppState;
use crate::types::{RequestStatus, Role};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenConversationRequest {
    pub tutor_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

async fn participant_conversation(state: &AppState, auth: &AuthUser, id: Uuid) -> Result<Conversation, ApiError> {
    let conversation = MessagingRepository::new(state.pool.clone())
        .find_conversation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Conversation not found"))?;
    if !conversation.has_participant(auth.user_id) {
        return Err(ApiError::forbidden("You are not part of this conversation"));
    }
    Ok(conversation)
}

/// POST /api/v1/conversations - Open (or return the existing) conversation with a tutor
pub async fn open(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<OpenConversationRequest>,
) -> ApiResult<Conversation> {
    auth.require_role(&[Role::Parent])?;
    let approved = TutorRepository::new(state.pool.clone())
        .find(body.tutor_id)
        .await?
        .map(|t| t.request_status == RequestStatus::Approve)
        .unwrap_or(false);
    if !approved {
        return Err(ApiError::not_found("Tutor not found"));
    }

    let conversation = MessagingRepository::new(state.pool.clone())
        .open_conversation(auth.user_id, body.tutor_id)
        .await?;
    Ok(ApiResponse::success(conversation))
}

/// GET /api/v1/conversations - Conversations with last message and unread count
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<ConversationView>> {
    let conversations = MessagingRepository::new(state.pool.clone())
        .list_for_user(auth.user_id)
        .await?;
    Ok(ApiResponse::success(conversations))
}

/// GET /api/v1/conversations/:id/messages - Newest first
pub async fn messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Message>> {
    participant_conversation(&state, &auth, id).await?;
    let page = page.resolve();
    let (messages, total) = MessagingRepository::new(state.pool.clone())
        .list_messages(id, page)
        .await?;
    Ok(ApiResponse::paged(messages, page.pagination(total)))
}

/// POST /api/v1/conversations/:id/messages - Send and push to the other participant
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> ApiResult<Message> {
    let conversation = participant_conversation(&state, &auth, id).await?;
    let content = validation::max_len("content", &body.content, 4000)?;

    let message = MessagingRepository::new(state.pool.clone())
        .insert_message(id, auth.user_id, content)
        .await?;

    state
        .hub
        .send_to_user(conversation.counterpart(auth.user_id), HubEvent::ReceiveMessage, &message)
        .await;

    Ok(ApiResponse::created(message))
}

/// PUT /api/v1/conversations/:id/read - Mark the other side's messages read
pub async fn mark_read(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<u64> {
    participant_conversation(&state, &auth, id).await?;
    let updated = MessagingRepository::new(state.pool.clone())
        .mark_read(id, auth.user_id)
        .await?;
    Ok(ApiResponse::success(updated))
}
