//! Shared application state

use std::sync::Arc;

use crate::{
    auth::AuthManager,
    cache::RedisHandles,
    config::Config,
    db::DbPool,
    services::{DishService, UserService},
    Error, Result,
};

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
    /// Open Redis connections when `redis.enabled` is set.
    pub connect_redis: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
            connect_redis: true,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DbPool,
    pub redis: Option<RedisHandles>,
    pub auth: Arc<AuthManager>,
    pub dish_service: Arc<DishService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        let options = AppStateOptions {
            run_migrations: config.database.run_migrations,
            ..AppStateOptions::default()
        };
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let config = Arc::new(config);
        let timestamps = config
            .database
            .timestamp_strategy()
            .map_err(Error::Config)?;

        let db = DbPool::connect(&config.database).await?;
        if options.run_migrations {
            db.run_migrations().await?;
        }

        let redis = if config.redis.enabled && options.connect_redis {
            Some(RedisHandles::connect(&config.redis).await?)
        } else {
            None
        };

        let auth = Arc::new(AuthManager::new(
            &config.auth,
            db.access_token_store(timestamps),
            redis.as_ref(),
        ));
        let dish_service = Arc::new(DishService::new(db.dish_store(timestamps)));
        let user_service = Arc::new(UserService::new(db.user_store(timestamps)));

        tracing::info!(
            backend = db.backend().as_str(),
            timestamps = ?timestamps,
            redis = redis.is_some(),
            "Application state initialized"
        );

        Ok(Self {
            config,
            db,
            redis,
            auth,
            dish_service,
            user_service,
        })
    }
}
