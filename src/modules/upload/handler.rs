use super::dto::UploadRequest;
use super::hub::ProgressHub;
use super::service::UploadService;
use crate::common::response::{ApiResponse, ApiSuccess};
use crate::modules::auth::dto::TokenClaims;
use crate::modules::video::model::Video;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Multipart, Path, State,
    },
    response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

/// Upload a clip. Responds once the clip is transcoded and published.
#[utoipa::path(
    post,
    path = "/api/v1/upload",
    request_body(content = UploadRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video transcoded and published", body = ApiResponse<Video>),
        (status = 400, description = "Invalid form, unsupported file, or transcoding failed"),
        (status = 401, description = "Missing token"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Upload",
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    multipart: Multipart,
) -> impl IntoResponse {
    match UploadService::upload(state, claims.sub, multipart).await {
        Ok(video) => ApiSuccess::created(video, "Video uploaded successfully!").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Live progress for one upload session (WebSocket).
#[utoipa::path(
    get,
    path = "/api/v1/progress/{session_id}",
    params(("session_id" = String, Path, description = "Session id sent with the upload")),
    responses(
        (status = 101, description = "Switching to WebSocket; frames are JobEvent JSON")
    ),
    tag = "Upload"
)]
pub async fn progress_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let hub = state.progress.clone();
    ws.on_upgrade(move |socket| relay_progress(socket, hub, session_id))
}

async fn relay_progress(mut socket: WebSocket, hub: ProgressHub, session_id: String) {
    info!(session_id = %session_id, "Progress listener connected");
    let mut events = hub.subscribe(&session_id);

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(p) => p,
                        Err(e) => {
                            error!("Failed to serialize job event: {}", e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %session_id, skipped, "Progress listener lagged");
                }
                // The job finished; keep listening in case the client reuses the session.
                Err(RecvError::Closed) => events = hub.subscribe(&session_id),
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    drop(events);
    hub.release(&session_id);
    info!(session_id = %session_id, "Progress listener disconnected");
}
