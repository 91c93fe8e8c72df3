use crate::error::Result;
use crate::storage::{DbPool, MessageStore};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn any_after(&self, chat_id: Uuid, after: OffsetDateTime) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM messages
                WHERE chat_id = $1 AND created_at > $2
            )
            "#,
        )
        .bind(chat_id)
        .bind(after)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
