use crate::common::error::{AppError, AppResult};
use crate::modules::auth::dto::UserResponse;
use crate::modules::auth::repository::AuthRepository;
use crate::modules::video::model::Video;
use crate::modules::video::service::VideoService;
use crate::state::AppState;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    pub async fn profile(state: AppState, id: Uuid) -> AppResult<UserResponse> {
        AuthRepository::find_user_by_id(&state.db, id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn videos(state: AppState, id: Uuid) -> AppResult<Vec<Video>> {
        VideoService::list_by_creator(state, id).await
    }
}
