use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::NOW;
use crate::{
    db::{traits::AccessTokenStore, TimestampStrategy},
    Error, Result,
};

#[derive(Clone)]
pub struct SqliteAccessTokenStore {
    pool: SqlitePool,
    timestamps: TimestampStrategy,
}

impl SqliteAccessTokenStore {
    pub fn new(pool: SqlitePool, timestamps: TimestampStrategy) -> Self {
        Self { pool, timestamps }
    }
}

#[async_trait]
impl AccessTokenStore for SqliteAccessTokenStore {
    async fn create(&self, token_digest: &str, user_id: Uuid) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO access_tokens (token, user_id, created_at)
             VALUES ($1, $2, COALESCE($3, {NOW}))"
        ))
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
        // Text timestamps may differ in offset notation; compare as julian days.
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM access_tokens
             WHERE token = $1 AND julianday(created_at) >= julianday($2)",
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
