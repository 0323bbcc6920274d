//! Database access layer
//!
//! One `DbPool` per process, PostgreSQL or SQLite depending on the
//! configured URL. Stores borrow the pool per call; every mutating call runs
//! in its own transaction, and a transaction dropped before `commit` is
//! rolled back.

pub mod postgres;
pub(crate) mod query;
pub mod sqlite;
pub mod timestamps;
pub mod traits;

use std::{path::Path, str::FromStr, sync::Arc, time::Duration};

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    ConnectOptions, PgPool, SqlitePool,
};

use crate::{config::DatabaseConfig, Error, Result};

pub use postgres::{PostgresAccessTokenStore, PostgresDishStore, PostgresUserStore};
pub use sqlite::{SqliteAccessTokenStore, SqliteDishStore, SqliteUserStore};
pub use timestamps::TimestampStrategy;
pub use traits::{AccessTokenStore, DishStore, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    pub fn from_url(url: &str) -> std::result::Result<Self, String> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(format!(
                "database.url must start with postgres://, postgresql:// or sqlite: (got '{}')",
                url.split(':').next().unwrap_or_default()
            ))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

#[derive(Clone)]
pub enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    /// Open a pool for the configured URL.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let backend = config.backend().map_err(Error::Config)?;
        tracing::info!(backend = backend.as_str(), "Creating database connection pool...");

        let acquire_timeout = Duration::from_secs(config.pool_timeout_seconds);
        let max_lifetime =
            (config.max_lifetime_seconds > 0).then(|| Duration::from_secs(config.max_lifetime_seconds));

        let pool = match backend {
            DatabaseBackend::Postgres => {
                let mut options = PgConnectOptions::from_str(&config.url)?;
                if !config.log_statements {
                    options = options.disable_statement_logging();
                }
                let pool = PgPoolOptions::new()
                    .min_connections(config.pool_min_size)
                    .max_connections(config.pool_max_size)
                    .acquire_timeout(acquire_timeout)
                    .max_lifetime(max_lifetime)
                    .test_before_acquire(config.test_before_acquire)
                    .connect_with(options)
                    .await?;
                Self::Postgres(pool)
            }
            DatabaseBackend::Sqlite => {
                let in_memory = config.url.contains(":memory:");
                if !in_memory {
                    ensure_sqlite_parent_dir(&config.url)?;
                }
                let mut options = SqliteConnectOptions::from_str(&config.url)?.foreign_keys(true);
                if !config.log_statements {
                    options = options.disable_statement_logging();
                }
                let mut pool_options = SqlitePoolOptions::new()
                    .min_connections(config.pool_min_size)
                    .max_connections(config.pool_max_size)
                    .acquire_timeout(acquire_timeout)
                    .max_lifetime(max_lifetime)
                    .test_before_acquire(config.test_before_acquire);
                if in_memory {
                    // Closing the last connection drops an in-memory database.
                    pool_options = pool_options.idle_timeout(None).max_lifetime(None);
                }
                Self::Sqlite(pool_options.connect_with(options).await?)
            }
        };

        tracing::info!(
            backend = backend.as_str(),
            min = config.pool_min_size,
            max = config.pool_max_size,
            "Database pool created"
        );
        Ok(pool)
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Postgres(_) => DatabaseBackend::Postgres,
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
        }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!(backend = self.backend().as_str(), "Running database migrations...");
        match self {
            Self::Postgres(pool) => sqlx::migrate!("./migrations/postgres").run(pool).await?,
            Self::Sqlite(pool) => sqlx::migrate!("./migrations/sqlite").run(pool).await?,
        }
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            Self::Postgres(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
    }

    pub fn dish_store(&self, timestamps: TimestampStrategy) -> Arc<dyn DishStore> {
        match self {
            Self::Postgres(pool) => Arc::new(PostgresDishStore::new(pool.clone(), timestamps)),
            Self::Sqlite(pool) => Arc::new(SqliteDishStore::new(pool.clone(), timestamps)),
        }
    }

    pub fn user_store(&self, timestamps: TimestampStrategy) -> Arc<dyn UserStore> {
        match self {
            Self::Postgres(pool) => Arc::new(PostgresUserStore::new(pool.clone(), timestamps)),
            Self::Sqlite(pool) => Arc::new(SqliteUserStore::new(pool.clone(), timestamps)),
        }
    }

    pub fn access_token_store(&self, timestamps: TimestampStrategy) -> Arc<dyn AccessTokenStore> {
        match self {
            Self::Postgres(pool) => {
                Arc::new(PostgresAccessTokenStore::new(pool.clone(), timestamps))
            }
            Self::Sqlite(pool) => Arc::new(SqliteAccessTokenStore::new(pool.clone(), timestamps)),
        }
    }
}

/// SQLite will not create missing directories for a file database.
fn ensure_sqlite_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Config(format!(
                "cannot create database directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}
