//! HTTP transport
//!
//! Routes map one-to-one onto service calls; `crate::Error` is the only
//! translation from domain outcomes to status codes.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors_origins);
    let body_limit = state.config.server.max_request_body_size;

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/dishes", routes::dish_routes())
        .nest("/auth", routes::auth_routes())
        .nest("/users", routes::user_routes())
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(600));

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials (the session cookie) are only allowed with explicit origins.
    layer
        .allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
}
