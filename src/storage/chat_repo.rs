use crate::domain::chat::{Chat, ChatKind, NewChat, direct_key};
use crate::domain::user::UserProfile;
use crate::error::{AppError, Result};
use crate::storage::records::{ChatRow, MemberRow, ProfileRow};
use crate::storage::{ChatStore, DbPool};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;
use uuid::Uuid;

const CHAT_COLUMNS: &str =
    "id, is_group, name, group_admin, group_picture, last_message_at, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct ChatRepository {
    pool: DbPool,
}

impl ChatRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn members_of<'e, E>(executor: E, chat_id: Uuid) -> Result<BTreeMap<Uuid, OffsetDateTime>>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT chat_id, user_id, messages_deleted_at
            FROM chat_members
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|m| (m.user_id, m.messages_deleted_at)).collect())
    }
}

#[async_trait]
impl ChatStore for ChatRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let members = Self::members_of(&self.pool, id).await?;
        row.into_chat(members).map(Some)
    }

    async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<Chat>> {
        let rows = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            SELECT {CHAT_COLUMNS}
            FROM chats
            JOIN chat_members m ON m.chat_id = chats.id
            WHERE m.user_id = $1
            ORDER BY chats.updated_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let chat_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let member_rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT chat_id, user_id, messages_deleted_at
            FROM chat_members
            WHERE chat_id = ANY($1)
            "#,
        )
        .bind(&chat_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_chat: BTreeMap<Uuid, BTreeMap<Uuid, OffsetDateTime>> = BTreeMap::new();
        for m in member_rows {
            by_chat.entry(m.chat_id).or_default().insert(m.user_id, m.messages_deleted_at);
        }

        rows.into_iter()
            .map(|row| {
                let members = by_chat.remove(&row.id).unwrap_or_default();
                row.into_chat(members)
            })
            .collect()
    }

    async fn create(&self, new: NewChat) -> Result<Chat> {
        let mut tx = self.pool.begin().await?;

        let (is_group, name, admin, picture, key) = match &new.kind {
            ChatKind::Group { admin, name, picture } => {
                (true, Some(name.as_str()), Some(*admin), picture.as_deref(), None)
            }
            ChatKind::Direct => (false, None, None, None, Some(direct_key(&new.members))),
        };

        let row = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            INSERT INTO chats (is_group, name, group_admin, group_picture, direct_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(is_group)
        .bind(name)
        .bind(admin)
        .bind(picture)
        .bind(key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.constraint() == Some("chats_direct_key_key") {
                    return AppError::Conflict("This chat is already created".to_string());
                }
            }
            AppError::Database(e)
        })?;

        let member_ids: Vec<Uuid> = new.members.iter().copied().collect();
        let member_rows = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO chat_members (chat_id, user_id)
            SELECT $1, unnest($2::uuid[])
            RETURNING chat_id, user_id, messages_deleted_at
            "#,
        )
        .bind(row.id)
        .bind(&member_ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let members = member_rows.into_iter().map(|m| (m.user_id, m.messages_deleted_at)).collect();
        row.into_chat(members)
    }

    async fn update_group(
        &self,
        id: Uuid,
        members: &BTreeSet<Uuid>,
        name: &str,
        picture: Option<&str>,
    ) -> Result<Option<Chat>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            UPDATE chats
            SET name = $2, group_picture = $3, updated_at = NOW()
            WHERE id = $1 AND is_group
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(picture)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else { return Ok(None) };

        // Reconcile membership and markers in one step: removed members lose
        // their marker row, added members get a fresh sentinel, retained
        // members are left untouched.
        let member_ids: Vec<Uuid> = members.iter().copied().collect();
        sqlx::query("DELETE FROM chat_members WHERE chat_id = $1 AND user_id <> ALL($2::uuid[])")
            .bind(id)
            .bind(&member_ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO chat_members (chat_id, user_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT (chat_id, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&member_ids)
        .execute(&mut *tx)
        .await?;

        let member_map = Self::members_of(&mut *tx, id).await?;
        tx.commit().await?;

        row.into_chat(member_map).map(Some)
    }

    async fn remove_member(&self, id: Uuid, user_id: Uuid) -> Result<Option<Chat>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            UPDATE chats SET updated_at = NOW()
            WHERE id = $1
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else { return Ok(None) };

        sqlx::query("DELETE FROM chat_members WHERE chat_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let members = Self::members_of(&mut *tx, id).await?;
        tx.commit().await?;

        row.into_chat(members).map(Some)
    }

    async fn set_cleared_at(&self, id: Uuid, user_id: Uuid, at: OffsetDateTime) -> Result<Option<Chat>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE chat_members SET messages_deleted_at = $3 WHERE chat_id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Only bump updated_at when a marker actually moved; clearing a chat
        // the user has no marker in leaves the record untouched.
        let row = if updated > 0 {
            sqlx::query_as::<_, ChatRow>(&format!(
                "UPDATE chats SET updated_at = NOW() WHERE id = $1 RETURNING {CHAT_COLUMNS}"
            ))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            sqlx::query_as::<_, ChatRow>(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        };

        let Some(row) = row else { return Ok(None) };
        let members = Self::members_of(&mut *tx, id).await?;
        tx.commit().await?;

        row.into_chat(members).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Chat>> {
        let mut tx = self.pool.begin().await?;

        let members = Self::members_of(&mut *tx, id).await?;
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "DELETE FROM chats WHERE id = $1 RETURNING {CHAT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        row.map(|r| r.into_chat(members)).transpose()
    }

    async fn resolve_profiles(&self, ids: &[Uuid], exclude: Uuid) -> Result<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, first_name, last_name, profile_picture, about, email
            FROM users
            WHERE id = ANY($1) AND id <> $2
            ORDER BY last_name, first_name
            "#,
        )
        .bind(ids)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}
