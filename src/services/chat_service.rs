use crate::domain::chat::{Chat, ChatKind, NewChat};
use crate::domain::members::normalize_members;
use crate::domain::user::UserProfile;
use crate::domain::visibility::{Classification, classify};
use crate::error::{AppError, Result};
use crate::storage::{ChatStore, MessageStore};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// A chat together with member profiles resolved for one viewer. The viewer
/// is excluded from the profile list; storage still holds them as a member.
#[derive(Debug, Clone)]
pub struct ChatView {
    pub chat: Chat,
    pub members: Vec<UserProfile>,
}

/// The viewer's chat list, split into conversations to render as active and
/// ids to render as cleared. A chat is never in both.
#[derive(Debug, Clone)]
pub struct ChatsOverview {
    pub updated: Vec<ChatView>,
    pub cleared: Vec<Uuid>,
}

#[derive(Clone, Debug)]
pub struct ChatService {
    chats: Arc<dyn ChatStore>,
    messages: Arc<dyn MessageStore>,
}

impl ChatService {
    #[must_use]
    pub fn new(chats: Arc<dyn ChatStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self { chats, messages }
    }

    async fn view_for(&self, viewer: Uuid, chat: Chat) -> Result<ChatView> {
        let members = self.chats.resolve_profiles(&chat.member_ids(), viewer).await?;
        Ok(ChatView { chat, members })
    }

    /// Creates a group or direct chat for the viewer.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for a bad member list or a missing
    /// group name, `AppError::Conflict` if the direct pair already has a chat.
    #[tracing::instrument(err(level = "warn"), skip(self, members), fields(viewer = %viewer, is_group = is_group))]
    pub async fn create_chat(
        &self,
        viewer: Uuid,
        members: &[Uuid],
        name: Option<String>,
        is_group: bool,
    ) -> Result<ChatView> {
        let members = normalize_members(viewer, members, is_group)?;

        let kind = if is_group {
            let name = match name {
                Some(n) if !n.trim().is_empty() => n,
                _ => return Err(AppError::Validation("You must add a group name".to_string())),
            };
            ChatKind::Group { admin: viewer, name, picture: None }
        } else {
            ChatKind::Direct
        };

        let chat = self.chats.create(NewChat { kind, members }).await?;
        tracing::debug!(chat_id = %chat.id, "chat created");
        self.view_for(viewer, chat).await
    }

    /// Fetches one chat with member profiles resolved.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the chat does not exist.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(viewer = %viewer, chat_id = %chat_id))]
    pub async fn get_chat(&self, viewer: Uuid, chat_id: Uuid) -> Result<ChatView> {
        let chat = self.chats.find_by_id(chat_id).await?.ok_or(AppError::NotFound)?;
        self.view_for(viewer, chat).await
    }

    /// Splits the viewer's chats into active conversations and cleared ids.
    ///
    /// Groups and never-messaged chats are always active. For the rest, the
    /// chat stays active only if a message exists after the viewer's own
    /// clear marker, so the same chat can be cleared for one member and
    /// active for another.
    ///
    /// # Errors
    /// Returns `AppError::Database` if a store query fails.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(viewer = %viewer))]
    pub async fn get_chats(&self, viewer: Uuid) -> Result<ChatsOverview> {
        let chats = self.chats.find_by_member(viewer).await?;

        let mut updated = Vec::new();
        let mut cleared = Vec::new();
        for chat in chats {
            let active = match classify(&chat, viewer) {
                Classification::Active => true,
                Classification::CheckAfter(marker) => self.messages.any_after(chat.id, marker).await?,
            };
            if active {
                updated.push(self.view_for(viewer, chat).await?);
            } else {
                cleared.push(chat.id);
            }
        }

        Ok(ChatsOverview { updated, cleared })
    }

    /// Deletes a chat for everyone. Group chats may only be deleted by the
    /// admin; direct chats by either member.
    ///
    /// # Errors
    /// Returns `AppError::Forbidden` if the viewer lacks the right to delete,
    /// `AppError::NotFound` if the chat is absent or a racing delete won.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(viewer = %viewer, chat_id = %chat_id))]
    pub async fn delete_chat(&self, viewer: Uuid, chat_id: Uuid) -> Result<Chat> {
        let chat = self.chats.find_by_id(chat_id).await?.ok_or(AppError::NotFound)?;

        if chat.is_group() {
            if !chat.is_group_admin(viewer) {
                return Err(AppError::Forbidden("You are not the group admin".to_string()));
            }
        } else if !chat.is_member(viewer) {
            return Err(AppError::Forbidden("You are not a member of this chat".to_string()));
        }

        let deleted = self.chats.delete(chat_id).await?.ok_or(AppError::NotFound)?;
        tracing::debug!("chat deleted");
        Ok(deleted)
    }

    /// Replaces a group's members, name, and picture.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the chat is not a group, the name is
    /// missing, or the member list is too small; `AppError::Forbidden` unless
    /// the viewer is the group admin; `AppError::NotFound` if the chat is
    /// absent or deleted underneath the update.
    #[tracing::instrument(err(level = "warn"), skip(self, members), fields(viewer = %viewer, chat_id = %chat_id))]
    pub async fn update_group(
        &self,
        viewer: Uuid,
        chat_id: Uuid,
        members: &[Uuid],
        name: Option<String>,
        picture: Option<String>,
    ) -> Result<ChatView> {
        let chat = self.chats.find_by_id(chat_id).await?.ok_or(AppError::NotFound)?;

        if !chat.is_group() {
            return Err(AppError::Validation(
                "This chat is not a group chat, you can delete the whole chat".to_string(),
            ));
        }
        let name = match name {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(AppError::Validation("You must add a group name".to_string())),
        };
        if !chat.is_group_admin(viewer) {
            return Err(AppError::Forbidden(
                "You don't have access to add or remove members".to_string(),
            ));
        }

        let members = normalize_members(viewer, members, true)?;
        let updated = self
            .chats
            .update_group(chat_id, &members, &name, picture.as_deref())
            .await?
            .ok_or(AppError::NotFound)?;

        self.view_for(viewer, updated).await
    }

    /// Removes the viewer from a group they are a member of.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if the chat is not a group,
    /// `AppError::Conflict` if the viewer is the admin (the admin deletes the
    /// group instead), `AppError::NotFound` if the chat is absent.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(viewer = %viewer, chat_id = %chat_id))]
    pub async fn leave_group(&self, viewer: Uuid, chat_id: Uuid) -> Result<Chat> {
        let chat = self.chats.find_by_id(chat_id).await?.ok_or(AppError::NotFound)?;

        if !chat.is_group() {
            return Err(AppError::Validation("This chat isn't a group chat".to_string()));
        }
        if chat.is_group_admin(viewer) {
            return Err(AppError::Conflict(
                "You are the admin! You can delete this chat instead".to_string(),
            ));
        }

        self.chats.remove_member(chat_id, viewer).await?.ok_or(AppError::NotFound)
    }

    /// Moves the viewer's clear marker to now, hiding everything before it
    /// from their view of the chat. A viewer without a membership row gets
    /// the chat back unchanged.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the chat does not exist.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(viewer = %viewer, chat_id = %chat_id))]
    pub async fn clear_chat(&self, viewer: Uuid, chat_id: Uuid) -> Result<Chat> {
        self.chats
            .set_cleared_at(chat_id, viewer, OffsetDateTime::now_utc())
            .await?
            .ok_or(AppError::NotFound)
    }
}
