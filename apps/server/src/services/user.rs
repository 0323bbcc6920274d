//! Account management: registration, credential checks and profile updates.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::password,
    db::UserStore,
    models::{NewUser, User, UserAdminUpdate, UserCreate, UserPatch, UserUpdate},
    Error, Result,
};

pub const LOGIN_BAD_CREDENTIALS: &str = "LOGIN_BAD_CREDENTIALS";
pub const REGISTER_USER_ALREADY_EXISTS: &str = "REGISTER_USER_ALREADY_EXISTS";
pub const UPDATE_USER_EMAIL_ALREADY_EXISTS: &str = "UPDATE_USER_EMAIL_ALREADY_EXISTS";

pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, payload: UserCreate) -> Result<User> {
        payload.validate()?;
        self.create_user(payload.email, payload.password, payload.name, false)
            .await
    }

    /// Create an account with the superuser flag set (used by the seeder).
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User> {
        let payload = UserCreate {
            email: email.to_string(),
            password: password.to_string(),
            name: None,
        };
        payload.validate()?;
        self.create_user(payload.email, payload.password, None, true)
            .await
    }

    async fn create_user(
        &self,
        email: String,
        password: String,
        name: Option<String>,
        is_superuser: bool,
    ) -> Result<User> {
        if self.store.get_by_email(&email).await?.is_some() {
            return Err(Error::AlreadyExists(REGISTER_USER_ALREADY_EXISTS.to_string()));
        }

        let hashed_password = hash(password).await?;
        let new_user = NewUser {
            email,
            hashed_password,
            name,
            is_superuser,
        };

        match self.store.create(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, is_superuser, "User registered");
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same address.
            Err(e) if e.is_unique_violation() => {
                Err(Error::AlreadyExists(REGISTER_USER_ALREADY_EXISTS.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Check credentials for a login attempt.
    ///
    /// Unknown e-mail, wrong password and inactive account all yield the
    /// same `BadRequest` so callers cannot probe for accounts.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.store.get_by_email(email).await? else {
            // Burn comparable CPU time for unknown addresses.
            let _ = hash(password.to_string()).await;
            return Err(bad_credentials());
        };

        if !verify(password.to_string(), user.hashed_password.clone()).await? || !user.is_active {
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(bad_credentials());
        }

        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    /// Self-service update. Activity and privilege flags are untouched.
    pub async fn update_me(&self, user: &User, update: UserUpdate) -> Result<User> {
        update.validate()?;
        let patch = self.profile_patch(update).await?;
        self.apply(user.id, patch).await
    }

    pub async fn admin_update(&self, id: Uuid, update: UserAdminUpdate) -> Result<User> {
        update.validate()?;
        let UserAdminUpdate {
            profile,
            is_active,
            is_superuser,
            is_verified,
        } = update;

        let mut patch = self.profile_patch(profile).await?;
        patch.is_active = is_active;
        patch.is_superuser = is_superuser;
        patch.is_verified = is_verified;
        self.apply(id, patch).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(user_not_found(id));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn profile_patch(&self, update: UserUpdate) -> Result<UserPatch> {
        let hashed_password = match update.password {
            Some(password) => Some(hash(password).await?),
            None => None,
        };
        Ok(UserPatch {
            email: update.email,
            hashed_password,
            name: update.name,
            ..UserPatch::default()
        })
    }

    async fn apply(&self, id: Uuid, patch: UserPatch) -> Result<User> {
        match self.store.update(id, patch).await {
            Ok(Some(user)) => {
                tracing::debug!(user_id = %id, "User updated");
                Ok(user)
            }
            Ok(None) => Err(user_not_found(id)),
            Err(e) if e.is_unique_violation() => Err(Error::AlreadyExists(
                UPDATE_USER_EMAIL_ALREADY_EXISTS.to_string(),
            )),
            Err(e) => Err(e),
        }
    }
}

// Argon2 blocks for tens of milliseconds; run it on the blocking pool.
async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| Error::Internal(format!("password hashing failed: {e}")))
}

async fn verify(password: String, hashed: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hashed))
        .await
        .map_err(|e| Error::Internal(format!("password verification task failed: {e}")))
}

fn bad_credentials() -> Error {
    Error::BadRequest(LOGIN_BAD_CREDENTIALS.to_string())
}

fn user_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("user {id} not found"))
}
