use axum::Router;
use crate::state::AppState;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    crate::routes::configure_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AppConfig;
    use crate::infrastructure::storage::local::MediaStorage;
    use crate::modules::auth::service::AuthService;
    use crate::modules::upload::hub::ProgressHub;
    use crate::modules::upload::pipeline::testing::{FakeCatalog, FakeEncoder};
    use crate::modules::upload::pipeline::UploadPipeline;
    use crate::workers::transcoder::TranscodeQueue;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    // Routes exercised here never reach the database.
    async fn test_app() -> (tempfile::TempDir, AppState, Router) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::for_tests(dir.path());
        let storage = MediaStorage::new(config.media_dir.clone(), config.upload_tmp_dir.clone())
            .await
            .unwrap();
        let db = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();

        let pipeline = UploadPipeline::new(
            Arc::new(FakeEncoder::new(Some(10.0), &[], true)),
            Arc::new(FakeCatalog::default()),
            ProgressHub::new(),
        );
        let (queue, _receiver) = TranscodeQueue::new(pipeline, 1);

        let state = AppState::new(config, db, storage, queue);
        let app = create_app(state.clone());
        (dir, state, app)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_dir, _state, app) = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_without_token_is_unauthorized() {
        let (_dir, _state, app) = test_app().await;
        let response = app
            .oneshot(Request::post("/api/v1/upload").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn bad_token_is_forbidden() {
        let (_dir, _state, app) = test_app().await;
        let response = app
            .oneshot(
                Request::get("/api/v1/auth/me")
                    .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn me_reports_token_identity() {
        let (_dir, state, app) = test_app().await;
        let user_id = Uuid::new_v4();
        let token =
            AuthService::create_access_token(user_id, "mira", &state.config.jwt_secret, 60).unwrap();

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/auth/me?auth={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["userId"], user_id.to_string());
        assert_eq!(json["data"]["username"], "mira");
    }

    #[tokio::test]
    async fn media_files_are_served_with_ranges() {
        let (_dir, state, app) = test_app().await;
        tokio::fs::write(state.storage.media_path("clip.mp4"), b"0123456789")
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::get("/media/clip.mp4")
                    .header(header::RANGE, "bytes=2-5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"2345");
    }

    #[tokio::test]
    async fn staged_uploads_are_not_served() {
        let (_dir, state, app) = test_app().await;
        let staged = state.storage.staging_path("mov");
        tokio::fs::write(&staged, b"raw").await.unwrap();
        let name = staged.file_name().unwrap().to_str().unwrap().to_string();

        let response = app
            .oneshot(Request::get(format!("/media/{}", name)).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn progress_route_requires_websocket_upgrade() {
        let (_dir, _state, app) = test_app().await;
        let response = app
            .oneshot(Request::get("/api/v1/progress/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
