use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
}

/// Catalog row before the database assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
}
