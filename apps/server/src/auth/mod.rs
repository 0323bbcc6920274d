//! User authentication.
//!
//! Two transports share one user table:
//! - bearer (`Authorization: Bearer <token>`), backed by Redis when enabled
//!   and by stateless JWTs otherwise;
//! - cookie (HttpOnly session cookie), backed by the `access_tokens` table.
//!
//! Handlers ask for [`CurrentUser`] or [`SuperUser`]; the extractors resolve
//! the token, load the account and reject inactive users.

pub mod password;
pub mod strategy;

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use uuid::Uuid;

use crate::{
    cache::RedisHandles,
    config::AuthConfig,
    db::AccessTokenStore,
    models::User,
    state::AppState,
    Error, Result,
};

pub use strategy::{DatabaseTokenStrategy, JwtTokenStrategy, RedisTokenStrategy, TokenStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Bearer,
    Cookie,
}

#[derive(Clone)]
pub struct AuthManager {
    bearer: Arc<dyn TokenStrategy>,
    cookie: Arc<dyn TokenStrategy>,
    cookie_name: String,
    cookie_secure: bool,
    lifetime_seconds: u64,
}

impl AuthManager {
    pub fn new(
        config: &AuthConfig,
        tokens: Arc<dyn AccessTokenStore>,
        redis: Option<&RedisHandles>,
    ) -> Self {
        let lifetime = config.token_lifetime_seconds;

        let bearer: Arc<dyn TokenStrategy> = match redis {
            Some(handles) => Arc::new(RedisTokenStrategy::new(handles.auth.clone(), lifetime)),
            None => {
                let secret = match &config.jwt_secret {
                    Some(s) if !s.is_empty() => s.as_bytes().to_vec(),
                    _ => {
                        tracing::warn!(
                            "`auth.jwt_secret` is not set; using ephemeral secret (bearer tokens reset on restart)"
                        );
                        format!("{}{}", Uuid::new_v4(), Uuid::new_v4()).into_bytes()
                    }
                };
                Arc::new(JwtTokenStrategy::new(&secret, lifetime))
            }
        };

        Self {
            bearer,
            cookie: Arc::new(DatabaseTokenStrategy::new(tokens, lifetime)),
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
            lifetime_seconds: lifetime,
        }
    }

    pub fn strategy(&self, transport: Transport) -> &dyn TokenStrategy {
        match transport {
            Transport::Bearer => self.bearer.as_ref(),
            Transport::Cookie => self.cookie.as_ref(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Raw credentials carried by a request. A bearer header wins over a cookie.
    pub fn credentials(&self, headers: &HeaderMap) -> Option<(Transport, String)> {
        if let Some(authz) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = authz
                .strip_prefix("Bearer ")
                .or_else(|| authz.strip_prefix("bearer "))
            {
                return Some((Transport::Bearer, token.trim().to_string()));
            }
        }

        extract_cookie_value(headers, &self.cookie_name).map(|token| (Transport::Cookie, token))
    }

    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue> {
        let cookie = build_set_cookie(
            &self.cookie_name,
            token,
            self.lifetime_seconds,
            self.cookie_secure,
        );
        HeaderValue::from_str(&cookie)
            .map_err(|e| Error::Internal(format!("invalid session cookie: {e}")))
    }

    pub fn clear_cookie(&self) -> HeaderValue {
        let cookie = build_clear_cookie(&self.cookie_name, self.cookie_secure);
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// The authenticated, active user behind a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub transport: Transport,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if let Some(current) = parts.extensions.get::<CurrentUser>() {
            return Ok(current.clone());
        }

        let (transport, token) = state
            .auth
            .credentials(&parts.headers)
            .ok_or_else(unauthorized)?;

        let user_id = state
            .auth
            .strategy(transport)
            .read_token(&token)
            .await?
            .ok_or_else(unauthorized)?;

        let user = match state.user_service.get(user_id).await {
            Ok(user) if user.is_active => user,
            Ok(_) | Err(Error::NotFound(_)) => {
                tracing::debug!(user_id = %user_id, "Token for missing or inactive user");
                return Err(unauthorized());
            }
            Err(e) => return Err(e),
        };

        let current = CurrentUser {
            user,
            transport,
            token,
        };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// An authenticated user with the superuser flag.
#[derive(Debug, Clone)]
pub struct SuperUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SuperUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if !current.user.is_superuser {
            return Err(Error::Forbidden("FORBIDDEN".to_string()));
        }
        Ok(Self(current.user))
    }
}

fn unauthorized() -> Error {
    Error::Unauthorized("Unauthorized".to_string())
}

fn extract_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn build_set_cookie(name: &str, value: &str, max_age_seconds: u64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn build_clear_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
