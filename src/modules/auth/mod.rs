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
        .route("/signup", post(handler::signup))
        .route("/login", post(handler::login))
        .route("/reset-password", post(handler::reset_password))
        .route("/verify-token", post(handler::verify_token));

    let protected_routes = Router::new()
        .route("/me", get(handler::me))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware
        ));

    public_routes.merge(protected_routes)
}
