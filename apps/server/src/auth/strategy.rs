//! Token strategies: how an issued token maps back to a user.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use redis::{aio::ConnectionManager, Cmd};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{db::AccessTokenStore, models::User, Error, Result};

const JWT_AUDIENCE: &str = "menu-server:auth";
const REDIS_KEY_PREFIX: &str = "auth_token:";

#[async_trait]
pub trait TokenStrategy: Send + Sync {
    /// Owner of `token`, or `None` when it is unknown, expired or malformed.
    async fn read_token(&self, token: &str) -> Result<Option<Uuid>>;

    async fn write_token(&self, user: &User) -> Result<String>;

    async fn destroy_token(&self, token: &str) -> Result<()>;
}

/// 256 bits of randomness, hex encoded.
fn opaque_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Stateless HS256 tokens. Logout cannot revoke them.
pub struct JwtTokenStrategy {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_seconds: i64,
}

impl JwtTokenStrategy {
    pub fn new(secret: &[u8], lifetime_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime_seconds: i64::try_from(lifetime_seconds).unwrap_or(i64::MAX),
        }
    }
}

#[async_trait]
impl TokenStrategy for JwtTokenStrategy {
    async fn read_token(&self, token: &str) -> Result<Option<Uuid>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[JWT_AUDIENCE]);
        validation.leeway = 0;

        let Ok(data) = decode::<Claims>(token, &self.decoding, &validation) else {
            return Ok(None);
        };
        Ok(Uuid::parse_str(&data.claims.sub).ok())
    }

    async fn write_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime_seconds),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("cannot sign token: {e}")))
    }

    async fn destroy_token(&self, _token: &str) -> Result<()> {
        Ok(())
    }
}

/// Opaque tokens persisted in `access_tokens`; only the SHA-256 digest is stored.
pub struct DatabaseTokenStrategy {
    store: Arc<dyn AccessTokenStore>,
    lifetime_seconds: i64,
}

impl DatabaseTokenStrategy {
    pub fn new(store: Arc<dyn AccessTokenStore>, lifetime_seconds: u64) -> Self {
        Self {
            store,
            lifetime_seconds: i64::try_from(lifetime_seconds).unwrap_or(i64::MAX),
        }
    }

    fn digest(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}

#[async_trait]
impl TokenStrategy for DatabaseTokenStrategy {
    async fn read_token(&self, token: &str) -> Result<Option<Uuid>> {
        let not_before = Duration::try_seconds(self.lifetime_seconds)
            .and_then(|lifetime| Utc::now().checked_sub_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.find_user(&Self::digest(token), not_before).await
    }

    async fn write_token(&self, user: &User) -> Result<String> {
        let token = opaque_token();
        self.store.create(&Self::digest(&token), user.id).await?;
        Ok(token)
    }

    async fn destroy_token(&self, token: &str) -> Result<()> {
        self.store.delete(&Self::digest(token)).await
    }
}

/// Opaque tokens stored as `auth_token:<token>` with a Redis expiry.
pub struct RedisTokenStrategy {
    conn: ConnectionManager,
    lifetime_seconds: u64,
}

impl RedisTokenStrategy {
    pub fn new(conn: ConnectionManager, lifetime_seconds: u64) -> Self {
        Self {
            conn,
            lifetime_seconds,
        }
    }

    fn key(token: &str) -> String {
        format!("{REDIS_KEY_PREFIX}{token}")
    }

    fn store_command(token: &str, user_id: Uuid, lifetime_seconds: u64) -> Cmd {
        let mut cmd = redis::cmd("SET");
        cmd.arg(Self::key(token))
            .arg(user_id.to_string())
            .arg("EX")
            .arg(lifetime_seconds);
        cmd
    }
}

#[async_trait]
impl TokenStrategy for RedisTokenStrategy {
    async fn read_token(&self, token: &str) -> Result<Option<Uuid>> {
        let mut conn = self.conn.clone();
        let user_id: Option<String> = redis::cmd("GET")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await?;
        Ok(user_id.and_then(|id| Uuid::parse_str(&id).ok()))
    }

    async fn write_token(&self, user: &User) -> Result<String> {
        let token = opaque_token();
        let mut conn = self.conn.clone();
        let _: () = Self::store_command(&token, user.id, self.lifetime_seconds)
            .query_async(&mut conn)
            .await?;
        Ok(token)
    }

    async fn destroy_token(&self, token: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
