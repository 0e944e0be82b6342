use super::dto::LikeCountResponse;
use super::model::Video;
use super::repository::VideoRepository;
use crate::common::error::{AppError, AppResult};
use crate::common::response::ToggleResponse;
use crate::state::AppState;
use rand::seq::SliceRandom;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VideoService;

impl VideoService {
    /// Every published video, in a fresh random order per request.
    pub async fn feed(state: AppState) -> AppResult<Vec<Video>> {
        let mut videos = VideoRepository::list_all(&state.db).await?;
        if videos.is_empty() {
            return Err(AppError::NotFound("No videos found".to_string()));
        }
        videos.shuffle(&mut rand::rng());
        Ok(videos)
    }

    pub async fn require_by_file_name(pool: &PgPool, file_name: &str) -> AppResult<Video> {
        VideoRepository::find_by_file_name(pool, file_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    pub async fn get_by_file_name(state: AppState, file_name: &str) -> AppResult<Video> {
        Self::require_by_file_name(&state.db, file_name).await
    }

    pub async fn list_by_creator(state: AppState, creator_id: Uuid) -> AppResult<Vec<Video>> {
        VideoRepository::list_by_creator(&state.db, creator_id).await
    }

    pub async fn like_count(state: AppState, file_name: &str) -> AppResult<LikeCountResponse> {
        let video = Self::require_by_file_name(&state.db, file_name).await?;
        let like_count = VideoRepository::count_likes(&state.db, video.id).await?;
        Ok(LikeCountResponse { like_count })
    }

    pub async fn like_status(state: AppState, user_id: Uuid, file_name: &str) -> AppResult<ToggleResponse> {
        let video = Self::require_by_file_name(&state.db, file_name).await?;
        let liked = VideoRepository::has_liked(&state.db, user_id, video.id).await?;
        Ok(ToggleResponse { liked })
    }

    /// Unlike when a like exists, like otherwise. Reports the state afterwards.
    pub async fn toggle_like(state: AppState, user_id: Uuid, file_name: &str) -> AppResult<ToggleResponse> {
        let video = Self::require_by_file_name(&state.db, file_name).await?;

        let removed = VideoRepository::delete_like(&state.db, user_id, video.id).await?;
        if removed > 0 {
            return Ok(ToggleResponse { liked: false });
        }

        VideoRepository::insert_like(&state.db, user_id, video.id).await?;
        Ok(ToggleResponse { liked: true })
    }
}
