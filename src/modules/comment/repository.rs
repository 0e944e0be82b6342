use super::model::{Comment, CommentView, Reply, ReplyView};
use crate::common::error::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

pub struct CommentRepository;

impl CommentRepository {
    // --- COMMENTS ---

    pub async fn create_comment(
        pool: &PgPool,
        user_id: Uuid,
        video_id: Uuid,
        content: &str,
    ) -> AppResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (user_id, video_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, video_id, content, created_at
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    pub async fn comment_exists(pool: &PgPool, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// `viewer` drives the `liked` flag; anonymous viewers see `false` everywhere.
    pub async fn list_for_video(
        pool: &PgPool,
        video_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.user_id, c.video_id, c.content, c.created_at,
                   COUNT(cl.id) AS like_count,
                   COALESCE(BOOL_OR(cl.user_id = $2), FALSE) AS liked
            FROM comments c
            LEFT JOIN comment_likes cl ON cl.comment_id = c.id
            WHERE c.video_id = $1
            GROUP BY c.id
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(video_id)
        .bind(viewer)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn delete_comment_like(pool: &PgPool, comment_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_comment_like(pool: &PgPool, comment_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    // --- REPLIES ---

    pub async fn create_reply(
        pool: &PgPool,
        creator_id: Uuid,
        comment_id: Uuid,
        content: &str,
    ) -> AppResult<Reply> {
        let reply = sqlx::query_as::<_, Reply>(
            r#"
            INSERT INTO reply (creator_id, comment_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, creator_id, comment_id, content, created_at
            "#,
        )
        .bind(creator_id)
        .bind(comment_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(reply)
    }

    pub async fn reply_exists(pool: &PgPool, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reply WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    pub async fn list_replies(
        pool: &PgPool,
        comment_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<Vec<ReplyView>> {
        let replies = sqlx::query_as::<_, ReplyView>(
            r#"
            SELECT r.id, r.creator_id, r.comment_id, r.content, r.created_at,
                   COUNT(rl.id) AS like_count,
                   COALESCE(BOOL_OR(rl.user_id = $2), FALSE) AS liked
            FROM reply r
            LEFT JOIN reply_likes rl ON rl.reply_id = r.id
            WHERE r.comment_id = $1
            GROUP BY r.id
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(comment_id)
        .bind(viewer)
        .fetch_all(pool)
        .await?;

        Ok(replies)
    }

    pub async fn delete_reply_like(pool: &PgPool, reply_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM reply_likes WHERE reply_id = $1 AND user_id = $2")
            .bind(reply_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_reply_like(pool: &PgPool, reply_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reply_likes (reply_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(reply_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
