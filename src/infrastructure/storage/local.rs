use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Filesystem layout for uploads: raw files are staged in `tmp_dir`,
/// transcoded files live in `media_dir`.
#[derive(Clone, Debug)]
pub struct MediaStorage {
    pub media_dir: PathBuf,
    pub tmp_dir: PathBuf,
}

impl MediaStorage {
    pub async fn new(media_dir: PathBuf, tmp_dir: PathBuf) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(&media_dir).await?;
        tokio::fs::create_dir_all(&tmp_dir).await?;

        if tmp_dir.starts_with(&media_dir) {
            warn!(
                tmp = %tmp_dir.display(),
                "Staging directory is inside the media directory; raw uploads will be publicly served"
            );
        }

        info!("✅ Media storage ready at {}", media_dir.display());
        Ok(Self { media_dir, tmp_dir })
    }

    /// Fresh path for a raw upload, keeping the client's extension.
    pub fn staging_path(&self, extension: &str) -> PathBuf {
        self.tmp_dir.join(format!("{}.{}", Uuid::new_v4(), extension))
    }

    /// Output file name for a staged upload. Always `.mp4`.
    pub fn output_file_name(raw_path: &Path) -> String {
        let stem = raw_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        format!("{}.mp4", stem)
    }

    pub fn media_path(&self, file_name: &str) -> PathBuf {
        self.media_dir.join(file_name)
    }
}

/// Moves a finished file into place. Falls back to copy + delete when the two
/// paths are on different filesystems.
pub async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    remove_quietly(from).await;
    Ok(())
}

/// Removes a file, treating "already gone" as success. Failures are logged,
/// never returned: cleanup must not mask the error that triggered it.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to delete file: {}", e),
    }
}
