use crate::api::AppState;
use crate::api::middleware::AuthUser;
use crate::api::schemas::chats::{
    ChatPayload, ChatRecordPayload, ChatsPayload, CreateChat, UpdateGroup,
};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Creates a group or direct chat.
///
/// # Errors
/// Returns `AppError::Validation` for a bad member list or missing group
/// name, `AppError::Conflict` if the direct chat already exists.
pub async fn create_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateChat>,
) -> Result<impl IntoResponse> {
    let view = state
        .chat_service
        .create_chat(auth_user.user_id, &req.members, req.name, req.is_group)
        .await?;

    Ok((StatusCode::CREATED, Json(ChatPayload::from(view))))
}

/// Lists the caller's chats, split into active and cleared.
pub async fn get_chats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let overview = state.chat_service.get_chats(auth_user.user_id).await?;
    Ok(Json(ChatsPayload::from(overview)))
}

/// Fetches a single chat with member profiles resolved.
///
/// # Errors
/// Returns `AppError::NotFound` if the chat does not exist.
pub async fn get_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state.chat_service.get_chat(auth_user.user_id, chat_id).await?;
    Ok(Json(ChatPayload::from(view)))
}

/// Deletes a chat for everyone, returning the deleted record.
///
/// # Errors
/// Returns `AppError::Forbidden` if the caller may not delete this chat.
pub async fn delete_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let deleted = state.chat_service.delete_chat(auth_user.user_id, chat_id).await?;
    Ok(Json(ChatRecordPayload::from(deleted)))
}

/// Replaces a group's members, name, and picture.
///
/// # Errors
/// Returns `AppError::Validation` if the chat is not a group or the name is
/// missing, `AppError::Forbidden` unless the caller is the group admin.
pub async fn update_group(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<UpdateGroup>,
) -> Result<impl IntoResponse> {
    let view = state
        .chat_service
        .update_group(auth_user.user_id, chat_id, &req.members, req.name, req.group_picture)
        .await?;

    Ok(Json(ChatPayload::from(view)))
}

/// Moves the caller's clear marker to now.
pub async fn clear_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let chat = state.chat_service.clear_chat(auth_user.user_id, chat_id).await?;
    Ok(Json(ChatRecordPayload::from(chat)))
}

/// Removes the caller from a group chat.
///
/// # Errors
/// Returns `AppError::Conflict` if the caller is the group admin.
pub async fn leave_group(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let chat = state.chat_service.leave_group(auth_user.user_id, chat_id).await?;
    Ok(Json(ChatRecordPayload::from(chat)))
}
