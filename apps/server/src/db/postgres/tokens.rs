use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::{traits::AccessTokenStore, TimestampStrategy},
    Error, Result,
};

#[derive(Clone)]
pub struct PostgresAccessTokenStore {
    pool: PgPool,
    timestamps: TimestampStrategy,
}

impl PostgresAccessTokenStore {
    pub fn new(pool: PgPool, timestamps: TimestampStrategy) -> Self {
        Self { pool, timestamps }
    }
}

#[async_trait]
impl AccessTokenStore for PostgresAccessTokenStore {
    async fn create(&self, token_digest: &str, user_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO access_tokens (token, user_id, created_at)
             VALUES ($1, $2, COALESCE($3, now()))",
        )
        .bind(token_digest)
        .bind(user_id)
        .bind(self.timestamps.stamp())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn find_user(
        &self,
        token_digest: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM access_tokens WHERE token = $1 AND created_at >= $2",
        )
        .bind(token_digest)
        .bind(not_before)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn delete(&self, token_digest: &str) -> Result<()> {
        sqlx::query("DELETE FROM access_tokens WHERE token = $1")
            .bind(token_digest)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
