use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;
use axum::middleware;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router(state: AppState) -> axum::Router<AppState> {
    let public_routes = Router::new()
        .route("/videos/{file_name}/comments", get(handler::list_comments))
        .route("/comments/{id}/replies", get(handler::list_replies));

    let protected_routes = Router::new()
        .route("/videos/{file_name}/comments", post(handler::post_comment))
        .route("/comments/{id}/replies", post(handler::post_reply))
        .route("/comments/{id}/like", post(handler::toggle_comment_like))
        .route("/replies/{id}/like", post(handler::toggle_reply_like))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware
        ));

    public_routes.merge(protected_routes)
}
