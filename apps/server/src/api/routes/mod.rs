use crate::api::handlers::{auth, dishes, users};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn dish_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dishes::list_dishes).post(dishes::create_dish))
        .route("/by-name/:name", get(dishes::get_dish_by_name))
        .route(
            "/:id",
            get(dishes::get_dish)
                .put(dishes::update_dish)
                .delete(dishes::delete_dish),
        )
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        // Bearer transport
        .route("/jwt/login", post(auth::bearer_login))
        .route("/jwt/logout", post(auth::bearer_logout))
        // Cookie transport
        .route("/cookie/login", post(auth::cookie_login))
        .route("/cookie/logout", post(auth::cookie_logout))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::get_me).patch(users::update_me))
        .route(
            "/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
