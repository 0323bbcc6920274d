//! Registration, login and logout

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::extract::{FormBody, ValidJson},
    auth::{CurrentUser, Transport},
    models::{BearerResponse, LoginForm, UserCreate},
    state::AppState,
    Error, Result,
};

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<UserCreate>,
) -> Result<Response> {
    let user = state.user_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// POST /auth/jwt/login
pub async fn bearer_login(
    State(state): State<AppState>,
    FormBody(form): FormBody<LoginForm>,
) -> Result<Response> {
    let user = state
        .user_service
        .authenticate(&form.username, &form.password)
        .await?;
    let token = state
        .auth
        .strategy(Transport::Bearer)
        .write_token(&user)
        .await?;

    tracing::info!(user_id = %user.id, "Bearer login");
    Ok((
        StatusCode::OK,
        Json(BearerResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }),
    )
        .into_response())
}

/// POST /auth/jwt/logout
pub async fn bearer_logout(State(state): State<AppState>, current: CurrentUser) -> Result<Response> {
    if current.transport != Transport::Bearer {
        return Err(Error::Unauthorized("Unauthorized".to_string()));
    }
    state
        .auth
        .strategy(Transport::Bearer)
        .destroy_token(&current.token)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /auth/cookie/login
pub async fn cookie_login(
    State(state): State<AppState>,
    FormBody(form): FormBody<LoginForm>,
) -> Result<Response> {
    let user = state
        .user_service
        .authenticate(&form.username, &form.password)
        .await?;
    let token = state
        .auth
        .strategy(Transport::Cookie)
        .write_token(&user)
        .await?;
    let cookie = state.auth.session_cookie(&token)?;

    tracing::info!(user_id = %user.id, "Cookie login");
    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// POST /auth/cookie/logout
pub async fn cookie_logout(State(state): State<AppState>, current: CurrentUser) -> Result<Response> {
    if current.transport != Transport::Cookie {
        return Err(Error::Unauthorized("Unauthorized".to_string()));
    }
    state
        .auth
        .strategy(Transport::Cookie)
        .destroy_token(&current.token)
        .await?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, state.auth.clear_cookie());
    Ok(response)
}
