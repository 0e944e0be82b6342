use async_trait::async_trait;

use super::model::{NewVideo, Video};
use super::repository::VideoRepository;
use crate::common::error::AppResult;
use crate::infrastructure::db::pool::DbPool;

/// Where finished uploads are recorded.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn insert_video(&self, video: NewVideo) -> AppResult<Video>;
}

#[derive(Clone)]
pub struct PgVideoCatalog {
    pool: DbPool,
}

impl PgVideoCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoCatalog for PgVideoCatalog {
    async fn insert_video(&self, video: NewVideo) -> AppResult<Video> {
        VideoRepository::create_video(&self.pool, &video).await
    }
}
