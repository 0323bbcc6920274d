//! Liveness and dependency status

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

/// GET /health
///
/// 503 when the database does not answer. Redis is reported but does not
/// affect the status code.
pub async fn health(State(state): State<AppState>) -> Response {
    let database = match state.db.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            "unavailable"
        }
    };

    let redis = match &state.redis {
        None => "disabled",
        Some(handles) => match handles.cache.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Health check: redis unreachable");
                "unavailable"
            }
        },
    };

    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "redis": redis,
        })),
    )
        .into_response()
}
