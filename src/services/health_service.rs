use crate::error::Result;
use crate::storage::DbPool;

#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
}

impl HealthService {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Checks that the database answers a trivial query.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the database is unreachable.
    pub async fn check_database(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
