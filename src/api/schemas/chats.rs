use crate::domain::chat::Chat;
use crate::domain::user::UserProfile;
use crate::services::chat_service::{ChatView, ChatsOverview};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChat {
    pub members: Vec<Uuid>,
    pub name: Option<String>,
    #[serde(default)]
    pub is_group: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroup {
    pub members: Vec<Uuid>,
    pub name: Option<String>,
    pub group_picture: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A chat with member profiles resolved (the requesting user excluded).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub id: Uuid,
    pub is_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_admin: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_picture: Option<String>,
    pub members: Vec<Profile>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A chat as stored, with raw member ids and their clear markers. Returned
/// by mutations that do not resolve profiles (delete, clear, leave).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecordPayload {
    pub id: Uuid,
    pub is_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_admin: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_picture: Option<String>,
    pub members: Vec<Uuid>,
    pub messages_deleted_at: Vec<DeletionMarker>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionMarker {
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatsPayload {
    pub updated_chats: Vec<ChatPayload>,
    pub cleared_chats: Vec<Uuid>,
}

impl From<UserProfile> for Profile {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            profile_picture: p.profile_picture,
            about: p.about,
            email: p.email,
        }
    }
}

impl From<ChatView> for ChatPayload {
    fn from(view: ChatView) -> Self {
        let chat = view.chat;
        Self {
            id: chat.id,
            is_group: chat.is_group(),
            name: chat.name().map(ToString::to_string),
            group_admin: chat.group_admin(),
            group_picture: chat.picture().map(ToString::to_string),
            members: view.members.into_iter().map(Profile::from).collect(),
            last_message_at: chat.last_message_at,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

impl From<Chat> for ChatRecordPayload {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            is_group: chat.is_group(),
            name: chat.name().map(ToString::to_string),
            group_admin: chat.group_admin(),
            group_picture: chat.picture().map(ToString::to_string),
            members: chat.member_ids(),
            messages_deleted_at: chat
                .members
                .iter()
                .map(|(&user_id, &date)| DeletionMarker { user_id, date })
                .collect(),
            last_message_at: chat.last_message_at,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

impl From<ChatsOverview> for ChatsPayload {
    fn from(overview: ChatsOverview) -> Self {
        Self {
            updated_chats: overview.updated.into_iter().map(ChatPayload::from).collect(),
            cleared_chats: overview.cleared,
        }
    }
}
