use crate::common::error::AppResult;
use crate::modules::auth::model::User;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

pub struct AuthRepository;

impl AuthRepository {
    pub async fn create_user(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_user_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_user_by_username(pool: &PgPool, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Login accepts either identifier in a single field.
    pub async fn find_user_by_login(pool: &PgPool, username_or_email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1 LIMIT 1"
        ))
        .bind(username_or_email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password(pool: &PgPool, email: &str, password_hash: &str) -> AppResult<u64> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
