use super::dto::LikeCountResponse;
use super::model::Video;
use super::service::VideoService;
use crate::common::response::{ApiResponse, ApiSuccess, ToggleResponse};
use crate::modules::auth::dto::TokenClaims;
use crate::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
};

/// Randomized video feed
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    responses(
        (status = 200, description = "Shuffled list of videos", body = ApiResponse<Vec<Video>>),
        (status = 404, description = "No videos found")
    ),
    tag = "Videos"
)]
pub async fn list_feed(State(state): State<AppState>) -> impl IntoResponse {
    match VideoService::feed(state).await {
        Ok(videos) => ApiSuccess::ok(videos, "Videos retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{file_name}",
    params(("file_name" = String, Path, description = "Transcoded file name")),
    responses(
        (status = 200, description = "Video record", body = ApiResponse<Video>),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos"
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    match VideoService::get_by_file_name(state, &file_name).await {
        Ok(video) => ApiSuccess::ok(video, "Video retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{file_name}/likes",
    params(("file_name" = String, Path, description = "Transcoded file name")),
    responses(
        (status = 200, description = "Like count", body = ApiResponse<LikeCountResponse>),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos"
)]
pub async fn like_count(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    match VideoService::like_count(state, &file_name).await {
        Ok(count) => ApiSuccess::ok(count, "Like count retrieved").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{file_name}/like-status",
    params(("file_name" = String, Path, description = "Transcoded file name")),
    responses(
        (status = 200, description = "Whether the caller liked the video", body = ApiResponse<ToggleResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos",
    security(("bearer_auth" = []))
)]
pub async fn like_status(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    match VideoService::like_status(state, claims.sub, &file_name).await {
        Ok(status) => ApiSuccess::ok(status, "Like status retrieved").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/videos/{file_name}/like",
    params(("file_name" = String, Path, description = "Transcoded file name")),
    responses(
        (status = 200, description = "Like toggled", body = ApiResponse<ToggleResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos",
    security(("bearer_auth" = []))
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    match VideoService::toggle_like(state, claims.sub, &file_name).await {
        Ok(status) if status.liked => ApiSuccess::ok(status, "Video liked successfully").into_response(),
        Ok(status) => ApiSuccess::ok(status, "Video unliked successfully").into_response(),
        Err(e) => e.into_response(),
    }
}
