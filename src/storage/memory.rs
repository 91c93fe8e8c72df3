use crate::domain::chat::{Chat, ChatKind, NewChat, direct_key};
use crate::domain::user::UserProfile;
use crate::error::{AppError, Result};
use crate::storage::{ChatStore, MessageStore};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory store backing the service and HTTP tests; everything lives
/// behind one mutex, which is plenty for test traffic but not a production
/// backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    chats: HashMap<Uuid, Chat>,
    direct_keys: HashMap<String, Uuid>,
    users: HashMap<Uuid, UserProfile>,
    messages: Vec<(Uuid, OffsetDateTime)>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| AppError::Internal)
    }

    /// Registers a user profile for resolution.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the store lock is poisoned.
    pub fn seed_user(&self, profile: UserProfile) -> Result<()> {
        self.lock()?.users.insert(profile.id, profile);
        Ok(())
    }

    /// Records a message at the given time, the way the messaging subsystem
    /// would: the message row is added and the chat's last-message timestamp
    /// moves forward.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the store lock is poisoned.
    pub fn push_message(&self, chat_id: Uuid, created_at: OffsetDateTime) -> Result<()> {
        let mut inner = self.lock()?;
        inner.messages.push((chat_id, created_at));
        if let Some(chat) = inner.chats.get_mut(&chat_id) {
            chat.last_message_at = Some(chat.last_message_at.map_or(created_at, |t| t.max(created_at)));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>> {
        Ok(self.lock()?.chats.get(&id).cloned())
    }

    async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<Chat>> {
        let mut chats: Vec<Chat> = self
            .lock()?
            .chats
            .values()
            .filter(|c| c.is_member(user_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn create(&self, new: NewChat) -> Result<Chat> {
        let mut inner = self.lock()?;
        let now = OffsetDateTime::now_utc();

        let key = match &new.kind {
            ChatKind::Direct => {
                let key = direct_key(&new.members);
                if inner.direct_keys.contains_key(&key) {
                    return Err(AppError::Conflict("This chat is already created".to_string()));
                }
                Some(key)
            }
            ChatKind::Group { .. } => None,
        };

        let chat = Chat {
            id: Uuid::new_v4(),
            kind: new.kind,
            members: new.members.into_iter().map(|m| (m, now)).collect(),
            last_message_at: None,
            created_at: now,
            updated_at: now,
        };

        if let Some(key) = key {
            inner.direct_keys.insert(key, chat.id);
        }
        inner.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn update_group(
        &self,
        id: Uuid,
        members: &BTreeSet<Uuid>,
        name: &str,
        picture: Option<&str>,
    ) -> Result<Option<Chat>> {
        let mut inner = self.lock()?;
        let now = OffsetDateTime::now_utc();

        let Some(chat) = inner.chats.get_mut(&id) else { return Ok(None) };
        let ChatKind::Group { name: chat_name, picture: chat_picture, .. } = &mut chat.kind else {
            return Ok(None);
        };

        *chat_name = name.to_string();
        *chat_picture = picture.map(ToString::to_string);
        chat.members.retain(|m, _| members.contains(m));
        for &m in members {
            chat.members.entry(m).or_insert(now);
        }
        chat.updated_at = now;

        Ok(Some(chat.clone()))
    }

    async fn remove_member(&self, id: Uuid, user_id: Uuid) -> Result<Option<Chat>> {
        let mut inner = self.lock()?;
        let Some(chat) = inner.chats.get_mut(&id) else { return Ok(None) };

        chat.members.remove(&user_id);
        chat.updated_at = OffsetDateTime::now_utc();
        Ok(Some(chat.clone()))
    }

    async fn set_cleared_at(&self, id: Uuid, user_id: Uuid, at: OffsetDateTime) -> Result<Option<Chat>> {
        let mut inner = self.lock()?;
        let Some(chat) = inner.chats.get_mut(&id) else { return Ok(None) };

        if let Some(marker) = chat.members.get_mut(&user_id) {
            *marker = at;
            chat.updated_at = OffsetDateTime::now_utc();
        }
        Ok(Some(chat.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Chat>> {
        let mut inner = self.lock()?;
        let Some(chat) = inner.chats.remove(&id) else { return Ok(None) };

        if let ChatKind::Direct = chat.kind {
            let key = direct_key(&chat.members.keys().copied().collect::<BTreeSet<Uuid>>());
            inner.direct_keys.remove(&key);
        }
        Ok(Some(chat))
    }

    async fn resolve_profiles(&self, ids: &[Uuid], exclude: Uuid) -> Result<Vec<UserProfile>> {
        let inner = self.lock()?;
        let mut profiles: Vec<UserProfile> = ids
            .iter()
            .filter(|&&id| id != exclude)
            .filter_map(|id| inner.users.get(id).cloned())
            .collect();
        profiles.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(profiles)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn any_after(&self, chat_id: Uuid, after: OffsetDateTime) -> Result<bool> {
        Ok(self.lock()?.messages.iter().any(|&(c, at)| c == chat_id && at > after))
    }
}
