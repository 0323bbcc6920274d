use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{NEXT_UPDATED_AT, NOW};
use crate::{
    db::{query::USER_COLUMNS, traits::UserStore, TimestampStrategy},
    models::{NewUser, User, UserPatch},
    Error, Result,
};

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
    timestamps: TimestampStrategy,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool, timestamps: TimestampStrategy) -> Self {
        Self { pool, timestamps }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, hashed_password, is_active, is_superuser, is_verified, name, created_at, updated_at)
             VALUES ($1, $2, $3, 1, $4, 0, $5, COALESCE($6, {NOW}), COALESCE($6, {NOW}))
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.is_superuser)
        .bind(&user.name)
        .bind(self.timestamps.stamp())
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        if let Some(email) = patch.email {
            builder.push("email = ").push_bind(email).push(", ");
        }
        if let Some(hashed_password) = patch.hashed_password {
            builder
                .push("hashed_password = ")
                .push_bind(hashed_password)
                .push(", ");
        }
        if let Some(name) = patch.name {
            builder.push("name = ").push_bind(name).push(", ");
        }
        if let Some(is_active) = patch.is_active {
            builder.push("is_active = ").push_bind(is_active).push(", ");
        }
        if let Some(is_superuser) = patch.is_superuser {
            builder
                .push("is_superuser = ")
                .push_bind(is_superuser)
                .push(", ");
        }
        if let Some(is_verified) = patch.is_verified {
            builder
                .push("is_verified = ")
                .push_bind(is_verified)
                .push(", ");
        }
        builder
            .push("updated_at = COALESCE(")
            .push_bind(self.timestamps.stamp())
            .push(format!(", {NEXT_UPDATED_AT}) WHERE id = "))
            .push_bind(id)
            .push(format!(" RETURNING {USER_COLUMNS}"));

        let updated = builder
            .build_query_as::<User>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?
            .rows_affected();
        Ok(removed > 0)
    }
}
