use serde::Deserialize;
use std::path::PathBuf;
use crate::config::env::{self, EnvKey};

const DEFAULT_MEDIA_DIR: &str = "./media";
/// Kept outside the media directory, which is served publicly.
const DEFAULT_UPLOAD_TMP_DIR: &str = "./uploads";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
    /// Durable home of transcoded videos, served under `/media`.
    pub media_dir: PathBuf,
    /// Raw uploads and in-progress encodes live here until a job finishes.
    pub upload_tmp_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub transcode_workers: usize,
    pub transcode_queue_capacity: usize,
    pub max_upload_mb: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        let default_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            jwt_secret: env::get(EnvKey::JwtSecret)?,
            jwt_ttl_seconds: env::get_parsed(EnvKey::JwtTtlSeconds, 3600),
            media_dir: PathBuf::from(env::get_or(EnvKey::MediaDir, DEFAULT_MEDIA_DIR)),
            upload_tmp_dir: PathBuf::from(env::get_or(EnvKey::UploadTmpDir, DEFAULT_UPLOAD_TMP_DIR)),
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, "ffmpeg"),
            ffprobe_path: env::get_or(EnvKey::FfprobePath, "ffprobe"),
            transcode_workers: env::get_parsed(EnvKey::TranscodeWorkers, default_workers).max(1),
            transcode_queue_capacity: env::get_parsed(EnvKey::TranscodeQueueCapacity, 32).max(1),
            max_upload_mb: env::get_parsed(EnvKey::MaxUploadMb, 512),
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(root: &std::path::Path) -> Self {
        Self {
            server_port: 0,
            database_url: "postgres://localhost/clipshare_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_seconds: 3600,
            media_dir: root.join("media"),
            upload_tmp_dir: root.join("uploads"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            transcode_workers: 1,
            transcode_queue_capacity: 4,
            max_upload_mb: 16,
        }
    }
}
