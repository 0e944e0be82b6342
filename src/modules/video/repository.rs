use super::model::{NewVideo, Video};
use crate::common::error::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

const VIDEO_COLUMNS: &str = "id, creator_id, title, description, file_name, created_at";

pub struct VideoRepository;

impl VideoRepository {
    pub async fn create_video(pool: &PgPool, video: &NewVideo) -> AppResult<Video> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            INSERT INTO videos (creator_id, title, description, file_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(video.creator_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.file_name)
        .fetch_one(pool)
        .await?;

        Ok(video)
    }

    pub async fn find_by_file_name(pool: &PgPool, file_name: &str) -> AppResult<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE file_name = $1"
        ))
        .bind(file_name)
        .fetch_optional(pool)
        .await?;

        Ok(video)
    }

    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(videos)
    }

    pub async fn list_by_creator(pool: &PgPool, creator_id: Uuid) -> AppResult<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE creator_id = $1 ORDER BY created_at DESC"
        ))
        .bind(creator_id)
        .fetch_all(pool)
        .await?;

        Ok(videos)
    }

    // --- LIKES ---

    pub async fn count_likes(pool: &PgPool, video_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn has_liked(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> AppResult<bool> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND video_id = $2)",
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_one(pool)
        .await?;
        Ok(liked)
    }

    pub async fn delete_like(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND video_id = $2")
            .bind(user_id)
            .bind(video_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_like(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> AppResult<()> {
        sqlx::query("INSERT INTO likes (user_id, video_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .bind(video_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
