//! Dish endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::extract::{ValidJson, ValidPath, ValidQuery},
    models::{DishFilter, DishListQuery, DishPatch, NewDish},
    state::AppState,
    Result,
};

/// POST /dishes
pub async fn create_dish(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewDish>,
) -> Result<Response> {
    let dish = state.dish_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(dish)).into_response())
}

/// GET /dishes
pub async fn list_dishes(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<DishListQuery>,
) -> Result<Response> {
    let filter = DishFilter::from(query);
    let dishes = state.dish_service.list(&filter).await?;
    Ok((StatusCode::OK, Json(dishes)).into_response())
}

/// GET /dishes/:id
pub async fn get_dish(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Response> {
    let dish = state.dish_service.get_by_id(id).await?;
    Ok((StatusCode::OK, Json(dish)).into_response())
}

/// GET /dishes/by-name/:name
pub async fn get_dish_by_name(
    State(state): State<AppState>,
    ValidPath(name): ValidPath<String>,
) -> Result<Response> {
    let dish = state.dish_service.get_by_name(&name).await?;
    Ok((StatusCode::OK, Json(dish)).into_response())
}

/// PUT /dishes/:id
///
/// Partial update: omitted (or null) fields keep their stored value.
pub async fn update_dish(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(patch): ValidJson<DishPatch>,
) -> Result<Response> {
    let dish = state.dish_service.update(id, patch).await?;
    Ok((StatusCode::OK, Json(dish)).into_response())
}

/// DELETE /dishes/:id
pub async fn delete_dish(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Response> {
    state.dish_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
