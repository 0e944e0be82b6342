use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::docs::ApiDoc;
use axum::Router;
use crate::state::AppState;

use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub fn configure_routes(state: AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", axum::routing::get(|| async { "ok" }))
        .nest("/api/v1/auth", crate::modules::auth::router(state.clone()))
        .nest("/api/v1/users", crate::modules::user::router(state.clone()))
        .nest("/api/v1/videos", crate::modules::video::router(state.clone()))
        .nest("/api/v1", api_routes(state.clone()))
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        .layer(cors)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(crate::modules::comment::router(state.clone()))
        .merge(crate::modules::upload::router(state))
}
