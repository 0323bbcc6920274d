//! Configuration management for the menu server
//!
//! `Config` is built once at startup (defaults, then an optional `config.*`
//! file, then `MENU__*` environment variables) and passed down explicitly.

use serde::Deserialize;
use std::net::SocketAddr;

use crate::db::{DatabaseBackend, TimestampStrategy};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes. Default: 1 MiB
    #[serde(default = "default_max_request_body_size")]
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` selects PostgreSQL, `sqlite:...` selects SQLite.
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_min_size")]
    pub pool_min_size: u32,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    /// Seconds to wait for a free connection before failing.
    #[serde(default = "default_pool_timeout")]
    pub pool_timeout_seconds: u64,
    /// Connections older than this are closed and replaced (0 = never).
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_seconds: u64,
    /// Ping connections before handing them out.
    #[serde(default = "default_true")]
    pub test_before_acquire: bool,
    /// Log every executed statement at debug level.
    #[serde(default)]
    pub log_statements: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
    /// Who assigns `created_at` / `updated_at`: `auto`, `database` or `application`.
    #[serde(default = "default_timestamps")]
    pub timestamps: String,
}

impl DatabaseConfig {
    pub fn backend(&self) -> Result<DatabaseBackend, String> {
        DatabaseBackend::from_url(&self.url)
    }

    /// Resolve the timestamp strategy for the configured backend.
    pub fn timestamp_strategy(&self) -> Result<TimestampStrategy, String> {
        let backend = self.backend()?;
        match self.timestamps.to_ascii_lowercase().as_str() {
            "auto" => Ok(TimestampStrategy::default_for(backend)),
            "database" => Ok(TimestampStrategy::Database),
            "application" => Ok(TimestampStrategy::Application),
            other => Err(format!(
                "database.timestamps must be one of auto, database, application (got '{other}')"
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Logical database holding bearer tokens.
    #[serde(default)]
    pub auth_db: u8,
    /// Logical database used as the general-purpose cache.
    #[serde(default = "default_cache_db")]
    pub cache_db: u8,
}

impl RedisConfig {
    pub fn auth_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.auth_db)
    }

    pub fn cache_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.cache_db)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            auth_db: 0,
            cache_db: default_cache_db(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer JWTs.
    ///
    /// If not set, the server generates an ephemeral secret at startup
    /// (issued tokens become invalid on restart).
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_seconds: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_seconds: default_token_lifetime(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting for logs (recommended for production)
    #[serde(default)]
    pub json: bool,

    /// Enable file logging in addition to console
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files (default: ./logs)
    #[serde(default = "default_log_directory")]
    pub file_directory: String,

    /// Log file prefix (default: menu-server)
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,

    /// Log rotation: daily, hourly, minutely, never (default: daily)
    #[serde(default = "default_log_rotation")]
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_enabled: false,
            file_directory: default_log_directory(),
            file_prefix: default_log_file_prefix(),
            file_rotation: default_log_rotation(),
        }
    }
}

// Default values
fn default_app_name() -> String {
    "Menu Server".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_max_request_body_size() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_database_url() -> String {
    "sqlite://./data/menu.sqlite3?mode=rwc".to_string()
}

fn default_pool_min_size() -> u32 {
    0
}

fn default_pool_max_size() -> u32 {
    20
}

fn default_pool_timeout() -> u64 {
    30
}

fn default_max_lifetime() -> u64 {
    3600
}

fn default_timestamps() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_cache_db() -> u8 {
    1
}

fn default_token_lifetime() -> u64 {
    3600
}

fn default_cookie_name() -> String {
    "auth_cookie".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "./logs".to_string()
}

fn default_log_file_prefix() -> String {
    "menu-server".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            // Start with defaults
            .set_default("app.name", default_app_name())?
            .set_default("app.debug", false)?
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default(
                "server.max_request_body_size",
                default_max_request_body_size() as i64,
            )?
            .set_default("database.url", default_database_url())?
            .set_default("database.pool_min_size", default_pool_min_size())?
            .set_default("database.pool_max_size", default_pool_max_size())?
            .set_default("database.pool_timeout_seconds", default_pool_timeout())?
            .set_default("database.max_lifetime_seconds", default_max_lifetime())?
            .set_default("database.test_before_acquire", default_true())?
            .set_default("database.log_statements", false)?
            .set_default("database.run_migrations", default_true())?
            .set_default("database.timestamps", default_timestamps())?
            .set_default("redis.enabled", false)?
            .set_default("redis.url", default_redis_url())?
            .set_default("auth.token_lifetime_seconds", default_token_lifetime())?
            .set_default("auth.cookie_name", default_cookie_name())?
            .set_default("auth.cookie_secure", false)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            .set_default("logging.file_enabled", false)?
            .set_default("logging.file_directory", default_log_directory())?
            .set_default("logging.file_prefix", default_log_file_prefix())?
            .set_default("logging.file_rotation", default_log_rotation())?
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables
            // Example: MENU__DATABASE__URL → config.database.url
            // Arrays use comma separator: MENU__SERVER__CORS_ORIGINS=https://a.com,https://b.com
            .add_source(
                config::Environment::with_prefix("MENU")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = config.try_deserialize()?;

        // Allow DATABASE_URL when no explicit MENU__DATABASE__URL override is present.
        if std::env::var("MENU__DATABASE__URL").is_err() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                config.database.url = url;
            }
        }

        Ok(config)
    }

    /// In-memory SQLite configuration used by tests and tooling.
    pub fn for_tests() -> Self {
        Self {
            app: AppConfig::default(),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: default_port(),
                cors_origins: default_cors_origins(),
                max_request_body_size: default_max_request_body_size(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                pool_min_size: 1,
                // A second connection would open a different in-memory database.
                pool_max_size: 1,
                pool_timeout_seconds: 5,
                max_lifetime_seconds: 0,
                test_before_acquire: false,
                log_statements: false,
                run_migrations: true,
                timestamps: default_timestamps(),
            },
            redis: RedisConfig::default(),
            auth: AuthConfig {
                jwt_secret: Some("test-secret-not-for-production".to_string()),
                ..AuthConfig::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        Ok(addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".to_string());
        }

        self.database.timestamp_strategy()?;
        if self.database.pool_max_size == 0 {
            return Err("database.pool_max_size must be > 0".to_string());
        }
        if self.database.pool_max_size < self.database.pool_min_size {
            return Err("database.pool_max_size must be >= database.pool_min_size".to_string());
        }
        if self.database.pool_timeout_seconds == 0 {
            return Err("database.pool_timeout_seconds must be > 0".to_string());
        }

        if self.auth.token_lifetime_seconds == 0 {
            return Err("auth.token_lifetime_seconds must be > 0".to_string());
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err("auth.cookie_name must not be empty".to_string());
        }

        crate::logging::parse_rotation(&self.logging.file_rotation)?;

        Ok(())
    }
}
