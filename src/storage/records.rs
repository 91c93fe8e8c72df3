use crate::domain::chat::{Chat, ChatKind};
use crate::domain::user::UserProfile;
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct ChatRow {
    pub id: Uuid,
    pub is_group: bool,
    pub name: Option<String>,
    pub group_admin: Option<Uuid>,
    pub group_picture: Option<String>,
    pub last_message_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct MemberRow {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub messages_deleted_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
}

impl ChatRow {
    /// Assembles a domain chat from this row and its membership rows. The
    /// schema CHECK guarantees group fields iff `is_group`; a row violating
    /// that is treated as corruption, not given a fallback shape.
    pub(crate) fn into_chat(self, members: BTreeMap<Uuid, OffsetDateTime>) -> Result<Chat> {
        let kind = match (self.is_group, self.group_admin, self.name) {
            (true, Some(admin), Some(name)) => ChatKind::Group { admin, name, picture: self.group_picture },
            (false, None, None) => ChatKind::Direct,
            _ => {
                tracing::error!(chat_id = %self.id, "chat row violates group field invariant");
                return Err(AppError::Internal);
            }
        };

        Ok(Chat {
            id: self.id,
            kind,
            members,
            last_message_at: self.last_message_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<ProfileRow> for UserProfile {
    fn from(record: ProfileRow) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            profile_picture: record.profile_picture,
            about: record.about,
            email: record.email,
        }
    }
}
