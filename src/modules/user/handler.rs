use super::service::UserService;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::modules::auth::dto::{TokenClaims, UserResponse};
use crate::modules::video::model::Video;
use crate::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match UserService::profile(state, id).await {
        Ok(user) => ApiSuccess::ok(user, "User retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Videos uploaded by the caller
#[utoipa::path(
    get,
    path = "/api/v1/users/me/videos",
    responses(
        (status = 200, description = "Caller's videos", body = ApiResponse<Vec<Video>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn my_videos(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
) -> impl IntoResponse {
    match UserService::videos(state, claims.sub).await {
        Ok(videos) => ApiSuccess::ok(videos, "Videos retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}
