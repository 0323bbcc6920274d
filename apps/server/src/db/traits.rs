//! Store traits implemented once per database backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{Dish, DishFilter, DishPatch, NewDish, NewUser, User, UserPatch},
    Result,
};

/// Persistence for dishes.
///
/// Absence is an ordinary outcome (`Ok(None)` / `Ok(false)`). A unique
/// constraint violation is returned untouched as `Error::Database`, after the
/// unit of work has been rolled back.
#[async_trait]
pub trait DishStore: Send + Sync {
    async fn create(&self, dish: NewDish) -> Result<Dish>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Dish>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Dish>>;

    /// Filter, then order, then page.
    async fn list(&self, filter: &DishFilter) -> Result<Vec<Dish>>;

    /// `Ok(None)` when no dish has this id; nothing is written in that case.
    async fn update(&self, id: i64, patch: DishPatch) -> Result<Option<Dish>>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Case-insensitive e-mail lookup.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Server-side access tokens for the cookie transport. Only digests are stored.
#[async_trait]
pub trait AccessTokenStore: Send + Sync {
    async fn create(&self, token_digest: &str, user_id: Uuid) -> Result<()>;

    /// Owner of a token issued at or after `not_before`.
    async fn find_user(
        &self,
        token_digest: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<Uuid>>;

    async fn delete(&self, token_digest: &str) -> Result<()>;
}
