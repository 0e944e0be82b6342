use axum::Router;
use axum::routing::get;
use crate::state::AppState;
use axum::middleware;

pub mod handler;
pub mod service;

pub fn router(state: AppState) -> axum::Router<AppState> {
    let public_routes = Router::new()
        .route("/{id}", get(handler::get_user));

    let protected_routes = Router::new()
        .route("/me/videos", get(handler::my_videos))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth::auth_middleware
        ));

    public_routes.merge(protected_routes)
}
