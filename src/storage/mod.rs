use crate::domain::chat::{Chat, NewChat};
use crate::domain::user::UserProfile;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use uuid::Uuid;

pub mod chat_repo;
pub mod memory;
pub mod message_repo;
pub mod records;

pub type DbPool = Pool<Postgres>;

/// Initializes the database connection pool.
///
/// # Errors
/// Returns `sqlx::Error` if the connection fails.
pub async fn init_pool(database_url: &str) -> std::result::Result<DbPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(20).connect(database_url).await
}

/// Runs pending migrations.
///
/// # Errors
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Persistence contract for chat records and member-profile resolution.
///
/// Membership and per-member clear markers are stored as one keyed mapping,
/// so every mutation that touches membership keeps the markers in step.
#[async_trait]
pub trait ChatStore: Send + Sync + std::fmt::Debug {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>>;

    /// Chats the user is a member of, most recently updated first.
    async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<Chat>>;

    /// Creates a chat with one clear marker per member, each starting at the
    /// member row's creation time.
    ///
    /// # Errors
    /// Returns `AppError::Conflict` if a direct chat for the same unordered
    /// member pair already exists. Uniqueness is enforced by the store, not
    /// by a lookup beforehand, so two racing creates cannot both win.
    async fn create(&self, new: NewChat) -> Result<Chat>;

    /// Replaces a group's members, name, and picture. Retained members keep
    /// their clear markers, added members get fresh ones, removed members'
    /// markers go with them. Returns `None` if the chat no longer exists.
    async fn update_group(
        &self,
        id: Uuid,
        members: &BTreeSet<Uuid>,
        name: &str,
        picture: Option<&str>,
    ) -> Result<Option<Chat>>;

    /// Removes one member (and their marker). Returns `None` if the chat no
    /// longer exists.
    async fn remove_member(&self, id: Uuid, user_id: Uuid) -> Result<Option<Chat>>;

    /// Sets the user's clear marker. A no-op if the user has no membership
    /// row. Returns `None` if the chat no longer exists.
    async fn set_cleared_at(&self, id: Uuid, user_id: Uuid, at: OffsetDateTime) -> Result<Option<Chat>>;

    /// Deletes the chat, returning the deleted record, or `None` if it was
    /// already gone.
    async fn delete(&self, id: Uuid) -> Result<Option<Chat>>;

    /// Resolves user ids to profile summaries, excluding the given id.
    async fn resolve_profiles(&self, ids: &[Uuid], exclude: Uuid) -> Result<Vec<UserProfile>>;
}

/// Read-only view of the message store owned by the messaging subsystem.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Whether any message in the chat was created strictly after `after`.
    async fn any_after(&self, chat_id: Uuid, after: OffsetDateTime) -> Result<bool>;
}
