use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, patch, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/users/add", post(handlers::form_add))
        .route("/users/:handle/edit", post(handlers::form_edit))
        .route("/users/:handle/delete", post(handlers::form_delete))
        .route("/api/today", get(handlers::get_today))
        .route("/api/users", get(handlers::list_users).post(handlers::add_user))
        .route(
            "/api/users/:handle",
            patch(handlers::update_user).delete(handlers::delete_user),
        )
        .route("/api/refresh", post(handlers::refresh))
        .with_state(state)
}
