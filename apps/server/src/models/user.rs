//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub name: Option<String>,
}

/// Self-service update (`PATCH /users/me`). Flags cannot be changed here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub name: Option<String>,
}

/// Superuser update (`PATCH /users/:id`): everything in [`UserUpdate`] plus flags.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserAdminUpdate {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: UserUpdate,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

/// Fields written on insert. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub name: Option<String>,
    pub is_superuser: bool,
}

/// Column-level patch passed to the user store.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_verified: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.hashed_password.is_none()
            && self.name.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
            && self.is_verified.is_none()
    }
}

/// Body returned by the bearer login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Form body of the login endpoints (`username` carries the e-mail).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
