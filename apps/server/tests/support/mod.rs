//! Shared harness for integration tests.
//!
//! Every test gets a fresh in-memory SQLite database with migrations applied
//! and drives the real router in-process.

use std::{future::Future, pin::Pin};

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use menu_server::{
    api::create_router,
    config::Config,
    models::{Dish, NewDish},
    state::{AppState, AppStateOptions},
};
use serde::Serialize;
use tower::ServiceExt;

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        self.request_with_extra_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;
        self.send(request).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encoded))?;
        self.send(request).await
    }

    async fn send(
        &self,
        request: Request<Body>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Vec<u8>)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, body.to_vec()))
    }

    /// Register an account and return a bearer token for it.
    pub async fn register_and_login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let (status, _, _) = self
            .request(
                Method::POST,
                "/auth/register",
                Some(to_json_body(&serde_json::json!({
                    "email": email,
                    "password": password,
                }))?),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, "register");

        self.bearer_login(email, password).await
    }

    pub async fn bearer_login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let (status, _, body) = self
            .post_form("/auth/jwt/login", &[("username", email), ("password", password)])
            .await?;
        assert_status(status, StatusCode::OK, "bearer login");
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(json["access_token"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("login response without access_token"))?
            .to_string())
    }

    pub async fn create_dish(&self, name: &str, description: Option<&str>) -> anyhow::Result<Dish> {
        let mut dish = NewDish::new(name);
        dish.description = description.map(str::to_string);
        Ok(self.state.dish_service.create(dish).await?)
    }
}

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> TestFuture,
{
    with_test_app_with_config(|_| {}, f).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> TestFuture,
{
    let mut config = Config::for_tests();
    configure(&mut config);

    let state = AppState::new_with_options(
        config,
        AppStateOptions {
            run_migrations: true,
            connect_redis: false,
        },
    )
    .await?;
    let router = create_router(state.clone());
    let db = state.db.clone();

    let result = f(TestApp { state, router }).await;
    db.close().await;
    result
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "{context}: unexpected status");
}

pub fn to_json_body<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
