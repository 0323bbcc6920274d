#![allow(unused)]
//! Registration, both login transports and the user endpoints.

mod support;

use axum::http::{header, Method, StatusCode};
use serde_json::{json, Value};
use support::*;

const PASSWORD: &str = "correct horse battery";

#[tokio::test]
async fn register_hides_password_and_rejects_duplicates() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let payload = to_json_body(&json!({
                "email": "chef@example.com",
                "password": PASSWORD,
                "name": "Chef"
            }))?;
            let (status, _, body) = app
                .request(Method::POST, "/auth/register", Some(payload))
                .await?;
            assert_status(status, StatusCode::CREATED, "register");
            let user: Value = serde_json::from_slice(&body)?;
            assert_eq!(user["email"], "chef@example.com");
            assert_eq!(user["is_active"], true);
            assert_eq!(user["is_superuser"], false);
            assert!(user.get("hashed_password").is_none());
            assert!(user.get("password").is_none());

            // Same address with different case is the same account.
            let again = to_json_body(&json!({ "email": "Chef@Example.com", "password": PASSWORD }))?;
            let (status, _, body) = app
                .request(Method::POST, "/auth/register", Some(again))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate register");
            let json: Value = serde_json::from_slice(&body)?;
            assert_eq!(json["detail"], "REGISTER_USER_ALREADY_EXISTS");

            let weak = to_json_body(&json!({ "email": "x@example.com", "password": "short" }))?;
            let (status, _, _) = app
                .request(Method::POST, "/auth/register", Some(weak))
                .await?;
            assert_status(status, StatusCode::UNPROCESSABLE_ENTITY, "short password");

            let bad_email = to_json_body(&json!({ "email": "not-an-email", "password": PASSWORD }))?;
            let (status, _, _) = app
                .request(Method::POST, "/auth/register", Some(bad_email))
                .await?;
            assert_status(status, StatusCode::UNPROCESSABLE_ENTITY, "invalid email");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn bearer_login_grants_access_to_me() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let token = app.register_and_login("cook@example.com", PASSWORD).await?;

            let (status, _, body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/users/me",
                    None,
                    &[("authorization", bearer(&token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "me");
            let me: Value = serde_json::from_slice(&body)?;
            assert_eq!(me["email"], "cook@example.com");

            let (status, headers, body) = app.request(Method::GET, "/users/me", None).await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "anonymous me");
            assert_eq!(
                headers.get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
                Some("Bearer")
            );

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/users/me",
                    None,
                    &[("authorization", "Bearer garbage")],
                )
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "garbage token");

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::POST,
                    "/auth/jwt/logout",
                    None,
                    &[("authorization", bearer(&token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "bearer logout");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.register_and_login("waiter@example.com", PASSWORD).await?;

            for (username, password) in [
                ("waiter@example.com", "wrong password"),
                ("nobody@example.com", PASSWORD),
            ] {
                let (status, _, body) = app
                    .post_form(
                        "/auth/jwt/login",
                        &[("username", username), ("password", password)],
                    )
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, username);
                let json: Value = serde_json::from_slice(&body)?;
                assert_eq!(json["detail"], "LOGIN_BAD_CREDENTIALS");
            }

            let (status, _, _) = app
                .post_form("/auth/jwt/login", &[("username", "waiter@example.com")])
                .await?;
            assert_status(status, StatusCode::UNPROCESSABLE_ENTITY, "missing password");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn form_login_accepts_reserved_characters() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let password = "50% off & free=dessert+tea 番茄";
            let token = app
                .register_and_login("sous+chef@example.com", password)
                .await?;

            let auth = bearer(&token);
            let (status, _, body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/users/me",
                    None,
                    &[("authorization", auth.as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "me");
            let me: Value = serde_json::from_slice(&body)?;
            assert_eq!(me["email"], "sous+chef@example.com");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn cookie_session_lifecycle() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.register_and_login("host@example.com", PASSWORD).await?;

            let (status, headers, _) = app
                .post_form(
                    "/auth/cookie/login",
                    &[("username", "host@example.com"), ("password", PASSWORD)],
                )
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "cookie login");
            let set_cookie = headers
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .expect("session cookie")
                .to_string();
            assert!(set_cookie.contains("HttpOnly"));
            let pair = set_cookie
                .split(';')
                .next()
                .expect("name=value")
                .to_string();
            assert!(pair.starts_with("auth_cookie="));

            let (status, _, body) = app
                .request_with_extra_headers(Method::GET, "/users/me", None, &[("cookie", pair.as_str())])
                .await?;
            assert_status(status, StatusCode::OK, "me via cookie");
            let me: Value = serde_json::from_slice(&body)?;
            assert_eq!(me["email"], "host@example.com");

            let (status, headers, _) = app
                .request_with_extra_headers(
                    Method::POST,
                    "/auth/cookie/logout",
                    None,
                    &[("cookie", pair.as_str())],
                )
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "cookie logout");
            let cleared = headers
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert!(cleared.contains("Max-Age=0"));

            // The server-side token is gone, so replaying the cookie fails.
            let (status, _, _) = app
                .request_with_extra_headers(Method::GET, "/users/me", None, &[("cookie", pair.as_str())])
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "replayed cookie");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn expired_cookie_tokens_are_rejected() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| {
            config.auth.token_lifetime_seconds = 1;
        },
        |app| {
            Box::pin(async move {
                app.register_and_login("late@example.com", PASSWORD).await?;
                let (_, headers, _) = app
                    .post_form(
                        "/auth/cookie/login",
                        &[("username", "late@example.com"), ("password", PASSWORD)],
                    )
                    .await?;
                let pair = headers
                    .get(header::SET_COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(';').next())
                    .expect("session cookie")
                    .to_string();

                tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

                let (status, _, _) = app
                    .request_with_extra_headers(Method::GET, "/users/me", None, &[("cookie", pair.as_str())])
                    .await?;
                assert_status(status, StatusCode::UNAUTHORIZED, "expired cookie");
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn users_update_their_own_profile() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let token = app.register_and_login("me@example.com", PASSWORD).await?;
            let auth = bearer(&token);

            let (status, _, body) = app
                .request_with_extra_headers(
                    Method::PATCH,
                    "/users/me",
                    Some(to_json_body(&json!({
                        "name": "Head Chef",
                        "password": "a much better password",
                        "is_superuser": true
                    }))?),
                    &[("authorization", auth.as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "patch me");
            let me: Value = serde_json::from_slice(&body)?;
            assert_eq!(me["name"], "Head Chef");
            // Privilege flags are not self-service.
            assert_eq!(me["is_superuser"], false);

            app.bearer_login("me@example.com", "a much better password")
                .await?;
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn user_administration_requires_superuser() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let admin = app
                .state
                .user_service
                .create_superuser("admin@example.com", PASSWORD)
                .await?;
            let admin_token = app.bearer_login("admin@example.com", PASSWORD).await?;
            let user_token = app.register_and_login("line@example.com", PASSWORD).await?;

            let (_, _, body) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/users/me",
                    None,
                    &[("authorization", bearer(&user_token).as_str())],
                )
                .await?;
            let user_id = serde_json::from_slice::<Value>(&body)?["id"]
                .as_str()
                .expect("uuid")
                .to_string();
            let user_path = format!("/users/{user_id}");

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    &format!("/users/{}", admin.id),
                    None,
                    &[("authorization", bearer(&user_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::FORBIDDEN, "regular user reads other user");

            let (status, _, body) = app
                .request_with_extra_headers(
                    Method::GET,
                    &user_path,
                    None,
                    &[("authorization", bearer(&admin_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "admin reads user");
            assert_eq!(serde_json::from_slice::<Value>(&body)?["email"], "line@example.com");

            let (status, _, body) = app
                .request_with_extra_headers(
                    Method::PATCH,
                    &user_path,
                    Some(to_json_body(&json!({ "is_verified": true, "name": "Line Cook" }))?),
                    &[("authorization", bearer(&admin_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "admin patches user");
            let patched: Value = serde_json::from_slice(&body)?;
            assert_eq!(patched["is_verified"], true);
            assert_eq!(patched["name"], "Line Cook");

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::PATCH,
                    &user_path,
                    Some(to_json_body(&json!({ "email": "admin@example.com" }))?),
                    &[("authorization", bearer(&admin_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::CONFLICT, "email collision");

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::PATCH,
                    &user_path,
                    Some(to_json_body(&json!({ "is_active": false }))?),
                    &[("authorization", bearer(&admin_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::OK, "deactivate");

            // Deactivated accounts lose access and cannot log in again.
            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::GET,
                    "/users/me",
                    None,
                    &[("authorization", bearer(&user_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "inactive token");
            let (status, _, _) = app
                .post_form(
                    "/auth/jwt/login",
                    &[("username", "line@example.com"), ("password", PASSWORD)],
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "inactive login");

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::DELETE,
                    &user_path,
                    None,
                    &[("authorization", bearer(&admin_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete user");

            let (status, _, _) = app
                .request_with_extra_headers(
                    Method::DELETE,
                    &user_path,
                    None,
                    &[("authorization", bearer(&admin_token).as_str())],
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "delete twice");
            Ok(())
        })
    })
    .await
}
