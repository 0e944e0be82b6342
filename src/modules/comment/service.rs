use super::dto::{PostCommentRequest, PostReplyRequest};
use super::model::{Comment, CommentView, Reply, ReplyView};
use super::repository::CommentRepository;
use crate::common::error::{AppError, AppResult};
use crate::common::response::ToggleResponse;
use crate::modules::video::service::VideoService;
use crate::state::AppState;
use uuid::Uuid;
use validator::Validate;

pub struct CommentService;

impl CommentService {
    async fn require_comment(state: &AppState, id: Uuid) -> AppResult<()> {
        if CommentRepository::comment_exists(&state.db, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Comment not found".to_string()))
        }
    }

    pub async fn post_comment(
        state: AppState,
        user_id: Uuid,
        file_name: &str,
        req: PostCommentRequest,
    ) -> AppResult<Comment> {
        req.validate()?;
        if req.comment.trim().is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        let video = VideoService::require_by_file_name(&state.db, file_name).await?;
        CommentRepository::create_comment(&state.db, user_id, video.id, req.comment.trim()).await
    }

    pub async fn list_comments(
        state: AppState,
        viewer: Option<Uuid>,
        file_name: &str,
    ) -> AppResult<Vec<CommentView>> {
        let video = VideoService::require_by_file_name(&state.db, file_name).await?;
        CommentRepository::list_for_video(&state.db, video.id, viewer).await
    }

    pub async fn toggle_comment_like(state: AppState, user_id: Uuid, comment_id: Uuid) -> AppResult<ToggleResponse> {
        Self::require_comment(&state, comment_id).await?;

        if CommentRepository::delete_comment_like(&state.db, comment_id, user_id).await? > 0 {
            return Ok(ToggleResponse { liked: false });
        }
        CommentRepository::insert_comment_like(&state.db, comment_id, user_id).await?;
        Ok(ToggleResponse { liked: true })
    }

    pub async fn post_reply(
        state: AppState,
        user_id: Uuid,
        comment_id: Uuid,
        req: PostReplyRequest,
    ) -> AppResult<Reply> {
        req.validate()?;
        if req.reply.trim().is_empty() {
            return Err(AppError::Validation("Reply cannot be empty".to_string()));
        }
        Self::require_comment(&state, comment_id).await?;
        CommentRepository::create_reply(&state.db, user_id, comment_id, req.reply.trim()).await
    }

    pub async fn list_replies(
        state: AppState,
        viewer: Option<Uuid>,
        comment_id: Uuid,
    ) -> AppResult<Vec<ReplyView>> {
        Self::require_comment(&state, comment_id).await?;
        CommentRepository::list_replies(&state.db, comment_id, viewer).await
    }

    pub async fn toggle_reply_like(state: AppState, user_id: Uuid, reply_id: Uuid) -> AppResult<ToggleResponse> {
        if !CommentRepository::reply_exists(&state.db, reply_id).await? {
            return Err(AppError::NotFound("Reply not found".to_string()));
        }

        if CommentRepository::delete_reply_like(&state.db, reply_id, user_id).await? > 0 {
            return Ok(ToggleResponse { liked: false });
        }
        CommentRepository::insert_reply_like(&state.db, reply_id, user_id).await?;
        Ok(ToggleResponse { liked: true })
    }
}
