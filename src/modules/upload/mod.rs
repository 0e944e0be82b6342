use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use crate::state::AppState;
use axum::middleware;
use std::convert::Infallible;
use tower_http::limit::RequestBodyLimitLayer;

pub mod dto;
pub mod encoder;
pub mod events;
pub mod handler;
pub mod hub;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod service;

pub fn router(state: AppState) -> axum::Router<AppState> {
    let max_upload = state.config.max_upload_bytes();

    let public_routes = Router::new()
        .route("/progress/{session_id}", get(handler::progress_socket));

    let protected_routes = Router::new()
        .route(
            "/upload",
            post(handler::upload_video)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(max_upload)),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware
        ));

    public_routes.merge(protected_routes)
}
