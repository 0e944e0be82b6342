use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;
use axum::middleware;

pub mod catalog;
pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router(state: AppState) -> axum::Router<AppState> {
    let public_routes = Router::new()
        .route("/", get(handler::list_feed))
        .route("/{file_name}", get(handler::get_video))
        .route("/{file_name}/likes", get(handler::like_count));

    let protected_routes = Router::new()
        .route("/{file_name}/like-status", get(handler::like_status))
        .route("/{file_name}/like", post(handler::toggle_like))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware
        ));

    public_routes.merge(protected_routes)
}
