//! SQLite-backed `DishStore` implementation

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{NEXT_UPDATED_AT, NOW};
use crate::{
    db::{
        query::{contains_pattern, order_clause, DISH_COLUMNS},
        traits::DishStore,
        TimestampStrategy,
    },
    models::{Dish, DishFilter, DishPatch, NewDish},
    Error, Result,
};

#[derive(Clone)]
pub struct SqliteDishStore {
    pool: SqlitePool,
    timestamps: TimestampStrategy,
}

impl SqliteDishStore {
    pub fn new(pool: SqlitePool, timestamps: TimestampStrategy) -> Self {
        Self { pool, timestamps }
    }
}

#[async_trait]
impl DishStore for SqliteDishStore {
    async fn create(&self, dish: NewDish) -> Result<Dish> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let created = sqlx::query_as::<_, Dish>(&format!(
            "INSERT INTO dishes (name, description, created_at, updated_at)
             VALUES ($1, $2, COALESCE($3, {NOW}), COALESCE($3, {NOW}))
             RETURNING {DISH_COLUMNS}"
        ))
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(self.timestamps.stamp())
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        tracing::debug!(dish_id = created.id, "Dish inserted");
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Dish>> {
        sqlx::query_as::<_, Dish>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Dish>> {
        sqlx::query_as::<_, Dish>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn list(&self, filter: &DishFilter) -> Result<Vec<Dish>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {DISH_COLUMNS} FROM dishes"));

        // SQLite LIKE is already case-insensitive for ASCII.
        if let Some(search) = filter.search.as_deref() {
            let pattern = contains_pattern(search);
            builder
                .push(" WHERE (name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        let (limit, offset) = filter.bounded_page();
        builder
            .push(" ORDER BY ")
            .push(order_clause(filter))
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        builder
            .build_query_as::<Dish>()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn update(&self, id: i64, patch: DishPatch) -> Result<Option<Dish>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let current =
            sqlx::query_as::<_, Dish>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        let Some(current) = current else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(current));
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE dishes SET ");
        if let Some(name) = patch.name {
            builder.push("name = ").push_bind(name).push(", ");
        }
        if let Some(description) = patch.description {
            builder
                .push("description = ")
                .push_bind(description)
                .push(", ");
        }
        builder
            .push("updated_at = COALESCE(")
            .push_bind(self.timestamps.stamp())
            .push(format!(", {NEXT_UPDATED_AT}) WHERE id = "))
            .push_bind(id)
            .push(format!(" RETURNING {DISH_COLUMNS}"));

        let updated = builder
            .build_query_as::<Dish>()
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        tracing::debug!(dish_id = id, "Dish updated");
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let removed = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        if removed == 0 {
            return Ok(false);
        }

        tx.commit().await.map_err(Error::Database)?;

        tracing::debug!(dish_id = id, "Dish deleted");
        Ok(true)
    }
}
