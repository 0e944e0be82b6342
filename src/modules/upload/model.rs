use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use super::events::ProgressEvent;
use super::progress::{parse_elapsed, percent_complete};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Queued,
    Probing,
    Encoding,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }

    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Pending, Queued) | (Queued, Probing) | (Probing, Encoding) => true,
            (Encoding, Succeeded) => true,
            // Any live state may fail: spawn errors, closed queue.
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "PENDING",
            JobState::Queued => "QUEUED",
            JobState::Probing => "PROBING",
            JobState::Encoding => "ENCODING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// One upload-to-catalog attempt.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub raw_file_path: PathBuf,
    /// Encoder target, next to the raw file. Moved to `output_file_path`
    /// only once the encode succeeded.
    pub encode_file_path: PathBuf,
    pub output_file_path: PathBuf,
    pub output_file_name: String,
    pub title: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub session_id: String,
    pub total_duration_seconds: Option<f64>,
    pub last_reported_progress: u8,
    pub state: JobState,
}

impl UploadJob {
    pub fn new(
        raw_file_path: PathBuf,
        output_file_path: PathBuf,
        title: String,
        description: Option<String>,
        creator_id: Uuid,
        session_id: String,
    ) -> Self {
        let output_file_name = output_file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let encode_file_path = raw_file_path.with_extension("encoding.mp4");

        Self {
            raw_file_path,
            encode_file_path,
            output_file_path,
            output_file_name,
            title,
            description,
            creator_id,
            session_id,
            total_duration_seconds: None,
            last_reported_progress: 0,
            state: JobState::Pending,
        }
    }

    pub fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal job transition {} -> {}",
            self.state,
            next
        );
        info!(session_id = %self.session_id, from = %self.state, to = %next, "Upload job state change");
        self.state = next;
    }

    /// Feeds one line of encoder output. Returns an event only when the line
    /// moves the job strictly past the last reported percentage.
    pub fn observe_line(&mut self, line: &str) -> Option<ProgressEvent> {
        let total = self.total_duration_seconds?;
        let elapsed = parse_elapsed(line)?;
        let percent = percent_complete(elapsed, total)?;

        if percent <= self.last_reported_progress {
            return None;
        }
        self.last_reported_progress = percent;
        Some(ProgressEvent::running(&self.session_id, percent))
    }
}
