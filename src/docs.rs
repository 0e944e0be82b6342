use utoipa::OpenApi;
use crate::common::response::ToggleResponse;
use crate::modules::auth::dto::*;
use crate::modules::comment::dto::{PostCommentRequest, PostReplyRequest};
use crate::modules::comment::model::{Comment, CommentView, Reply, ReplyView};
use crate::modules::upload::dto::UploadRequest;
use crate::modules::upload::events::{JobEvent, JobStatusEvent, ProgressEvent};
use crate::modules::upload::model::JobState;
use crate::modules::video::dto::LikeCountResponse;
use crate::modules::video::model::Video;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::handler::signup,
        crate::modules::auth::handler::login,
        crate::modules::auth::handler::reset_password,
        crate::modules::auth::handler::verify_token,
        crate::modules::auth::handler::me,
        crate::modules::user::handler::get_user,
        crate::modules::user::handler::my_videos,
        crate::modules::video::handler::list_feed,
        crate::modules::video::handler::get_video,
        crate::modules::video::handler::like_count,
        crate::modules::video::handler::like_status,
        crate::modules::video::handler::toggle_like,
        crate::modules::comment::handler::post_comment,
        crate::modules::comment::handler::list_comments,
        crate::modules::comment::handler::toggle_comment_like,
        crate::modules::comment::handler::post_reply,
        crate::modules::comment::handler::list_replies,
        crate::modules::comment::handler::toggle_reply_like,
        crate::modules::upload::handler::upload_video,
        crate::modules::upload::handler::progress_socket,
    ),
    components(
        schemas(
            SignupRequest, LoginRequest, LoginResponse, ResetPasswordRequest,
            VerifyTokenRequest, VerifyTokenResponse, CurrentUserResponse, UserResponse,
            Video, LikeCountResponse, ToggleResponse,
            PostCommentRequest, PostReplyRequest, Comment, CommentView, Reply, ReplyView,
            UploadRequest, ProgressEvent, JobStatusEvent, JobEvent, JobState,
        )
    ),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "User profiles"),
        (name = "Videos", description = "Video feed and likes"),
        (name = "Comments", description = "Comments and replies"),
        (name = "Upload", description = "Upload, transcoding and live progress")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

use utoipa::Modify;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
