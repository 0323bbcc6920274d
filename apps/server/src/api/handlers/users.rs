//! Account endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    api::extract::{ValidJson, ValidPath},
    auth::{CurrentUser, SuperUser},
    models::{UserAdminUpdate, UserUpdate},
    state::AppState,
    Result,
};

/// GET /users/me
pub async fn get_me(current: CurrentUser) -> Result<Response> {
    Ok((StatusCode::OK, Json(current.user)).into_response())
}

/// PATCH /users/me
pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(update): ValidJson<UserUpdate>,
) -> Result<Response> {
    let user = state.user_service.update_me(&current.user, update).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    _admin: SuperUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Response> {
    let user = state.user_service.get(id).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// PATCH /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(update): ValidJson<UserAdminUpdate>,
) -> Result<Response> {
    let user = state.user_service.admin_update(id, update).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "User updated by superuser");
    Ok((StatusCode::OK, Json(user)).into_response())
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    SuperUser(admin): SuperUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Response> {
    state.user_service.delete(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "User deleted by superuser");
    Ok(StatusCode::NO_CONTENT.into_response())
}
