use crate::common::error::{AppError, AppResult};
use crate::infrastructure::storage::local::{remove_quietly, MediaStorage};
use axum::extract::multipart::Field;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

const DEFAULT_EXTENSION: &str = "mp4";

/// A raw upload written to the staging directory.
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    pub original_name: String,
    pub size: u64,
}

/// Accepts `video/*` by declared content type, or by the file name when the
/// client sent a generic type.
pub fn is_video_upload(content_type: Option<&str>, file_name: &str) -> bool {
    if content_type.is_some_and(|ct| ct.starts_with("video/")) {
        return true;
    }
    mime_guess::from_path(file_name)
        .first()
        .is_some_and(|m| m.type_() == mime_guess::mime::VIDEO)
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

pub async fn stream_to_disk(storage: &MediaStorage, mut field: Field<'_>) -> AppResult<StagedFile> {
    let original_name = field.file_name().unwrap_or("upload.mp4").to_string();

    if !is_video_upload(field.content_type(), &original_name) {
        return Err(AppError::Validation(
            "Invalid content type: only video files are allowed".to_string(),
        ));
    }

    let path = storage.staging_path(&extension_of(&original_name));
    let mut file = File::create(&path)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    let mut size = 0u64;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Upload stream error: {}", e);
                drop(file);
                remove_quietly(&path).await;
                return Err(AppError::Validation(format!("Upload interrupted: {}", e.body_text())));
            }
        };

        if let Err(e) = file.write_all(&chunk).await {
            error!("Failed writing upload to {}: {}", path.display(), e);
            drop(file);
            remove_quietly(&path).await;
            return Err(AppError::Internal(e.into()));
        }
        size += chunk.len() as u64;
    }

    if let Err(e) = file.flush().await {
        drop(file);
        remove_quietly(&path).await;
        return Err(AppError::Internal(e.into()));
    }

    info!("Staged upload {} ({} bytes) at {}", original_name, size, path.display());

    Ok(StagedFile { path, original_name, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_video_by_content_type_or_name() {
        assert!(is_video_upload(Some("video/quicktime"), "clip"));
        assert!(is_video_upload(Some("application/octet-stream"), "clip.mp4"));
        assert!(is_video_upload(None, "clip.webm"));
        assert!(!is_video_upload(Some("image/png"), "cat.png"));
        assert!(!is_video_upload(None, "notes.txt"));
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(extension_of("Clip.MOV"), "mov");
        assert_eq!(extension_of("noext"), "mp4");
        assert_eq!(extension_of("weird.m p4"), "mp4");
    }
}
