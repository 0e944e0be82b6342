use super::dto::{PostCommentRequest, PostReplyRequest};
use super::model::{Comment, CommentView, Reply, ReplyView};
use super::service::CommentService;
use crate::common::response::{ApiResponse, ApiSuccess, ToggleResponse};
use crate::middleware::auth::OptionalClaims;
use crate::modules::auth::dto::TokenClaims;
use crate::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/videos/{file_name}/comments",
    params(("file_name" = String, Path, description = "Transcoded file name")),
    request_body = PostCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = ApiResponse<Comment>),
        (status = 400, description = "Empty comment"),
        (status = 404, description = "Video not found")
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
pub async fn post_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(file_name): Path<String>,
    Json(req): Json<PostCommentRequest>,
) -> impl IntoResponse {
    match CommentService::post_comment(state, claims.sub, &file_name, req).await {
        Ok(comment) => ApiSuccess::created(comment, "Comment posted successfully!").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Comments with like counts; `liked` reflects the caller when a token is sent
#[utoipa::path(
    get,
    path = "/api/v1/videos/{file_name}/comments",
    params(("file_name" = String, Path, description = "Transcoded file name")),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<CommentView>>),
        (status = 404, description = "Video not found")
    ),
    tag = "Comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Path(file_name): Path<String>,
) -> impl IntoResponse {
    let viewer = claims.map(|c| c.sub);
    match CommentService::list_comments(state, viewer, &file_name).await {
        Ok(comments) => ApiSuccess::ok(comments, "Comments retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/{id}/like",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Like toggled", body = ApiResponse<ToggleResponse>),
        (status = 404, description = "Comment not found")
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match CommentService::toggle_comment_like(state, claims.sub, id).await {
        Ok(status) if status.liked => ApiSuccess::ok(status, "Comment liked").into_response(),
        Ok(status) => ApiSuccess::ok(status, "Comment unliked").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/{id}/replies",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = PostReplyRequest,
    responses(
        (status = 201, description = "Reply posted", body = ApiResponse<Reply>),
        (status = 400, description = "Empty reply"),
        (status = 404, description = "Comment not found")
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
pub async fn post_reply(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<PostReplyRequest>,
) -> impl IntoResponse {
    match CommentService::post_reply(state, claims.sub, id, req).await {
        Ok(reply) => ApiSuccess::created(reply, "Reply posted successfully!").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}/replies",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Replies", body = ApiResponse<Vec<ReplyView>>),
        (status = 404, description = "Comment not found")
    ),
    tag = "Comments"
)]
pub async fn list_replies(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let viewer = claims.map(|c| c.sub);
    match CommentService::list_replies(state, viewer, id).await {
        Ok(replies) => ApiSuccess::ok(replies, "Replies retrieved successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/replies/{id}/like",
    params(("id" = Uuid, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Like toggled", body = ApiResponse<ToggleResponse>),
        (status = 404, description = "Reply not found")
    ),
    tag = "Comments",
    security(("bearer_auth" = []))
)]
pub async fn toggle_reply_like(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match CommentService::toggle_reply_like(state, claims.sub, id).await {
        Ok(status) if status.liked => ApiSuccess::ok(status, "Reply liked").into_response(),
        Ok(status) => ApiSuccess::ok(status, "Reply unliked").into_response(),
        Err(e) => e.into_response(),
    }
}
