use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

/// Read-only lookups into records this service does not own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    async fn candidate_exists(&self, candidate_id: Uuid) -> Result<bool>;

    async fn offer_exists(&self, offer_id: Uuid) -> Result<bool>;

    async fn recruiter_address(&self, user_id: Uuid) -> Result<Option<String>>;
}

#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn candidate_exists(&self, candidate_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE id = $1)")
                .bind(candidate_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn offer_exists(&self, offer_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM offers WHERE id = $1)")
            .bind(offer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn recruiter_address(&self, user_id: Uuid) -> Result<Option<String>> {
        let address: Option<Option<String>> =
            sqlx::query_scalar("SELECT address FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(address.flatten())
    }
}
