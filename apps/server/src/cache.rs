//! Redis connections.
//!
//! Two logical databases on one server: `auth` holds bearer tokens, `cache`
//! is a general-purpose JSON cache. Both are optional and only opened when
//! `redis.enabled` is set.

use std::time::Duration;

use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    Client, Cmd,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::RedisConfig, Error, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct RedisHandles {
    pub auth: ConnectionManager,
    pub cache: CacheHandle,
}

impl RedisHandles {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        tracing::info!(
            auth_db = config.auth_db,
            cache_db = config.cache_db,
            "Connecting to Redis..."
        );
        let auth = connection_manager(&config.auth_url()).await?;
        let cache = CacheHandle::new(connection_manager(&config.cache_url()).await?);
        tracing::info!("Redis connections established");
        Ok(Self { auth, cache })
    }
}

async fn connection_manager(url: &str) -> Result<ConnectionManager> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(1);

    let client = Client::open(url)?;
    tokio::time::timeout(
        CONNECT_TIMEOUT,
        client.get_connection_manager_with_config(config),
    )
    .await
    .map_err(|_| Error::Internal(format!("timed out connecting to Redis after {CONNECT_TIMEOUT:?}")))?
    .map_err(Error::Redis)
}

/// Thin JSON passthrough over the cache database.
#[derive(Clone)]
pub struct CacheHandle {
    conn: ConnectionManager,
}

impl CacheHandle {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        raw.map(|s| {
            serde_json::from_str(&s)
                .map_err(|e| Error::Internal(format!("corrupt cache entry '{key}': {e}")))
        })
        .transpose()
    }

    /// Store `value` under `key`; `ttl_seconds` of 0 means no expiry.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<()> {
        let payload = serde_json::to_string(value)
            .map_err(|e| Error::Internal(format!("cannot serialize cache entry '{key}': {e}")))?;
        let mut conn = self.conn.clone();
        let _: () = set_command(key, payload, ttl_seconds)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed > 0)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

fn set_command(key: &str, payload: String, ttl_seconds: u64) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(payload);
    if ttl_seconds > 0 {
        cmd.arg("EX").arg(ttl_seconds);
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_with_ttl_sends_ex() {
        let packed = set_command("menu:1", "{\"id\":1}".to_string(), 60).get_packed_command();
        assert_eq!(
            packed,
            b"*5\r\n$3\r\nSET\r\n$6\r\nmenu:1\r\n$8\r\n{\"id\":1}\r\n$2\r\nEX\r\n$2\r\n60\r\n"
        );
    }

    #[test]
    fn zero_ttl_never_expires() {
        let packed = set_command("menu:1", "1".to_string(), 0).get_packed_command();
        assert_eq!(packed, b"*3\r\n$3\r\nSET\r\n$6\r\nmenu:1\r\n$1\r\n1\r\n");
    }
}
