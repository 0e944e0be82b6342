use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::JobState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub session_id: String,
    pub progress: u8,
    pub complete: bool,
}

impl ProgressEvent {
    pub fn running(session_id: &str, progress: u8) -> Self {
        Self {
            session_id: session_id.to_string(),
            progress,
            complete: false,
        }
    }

    pub fn finished(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            progress: 100,
            complete: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusEvent {
    pub session_id: String,
    pub state: JobState,
}

/// Everything published on a session topic. Untagged so progress frames keep
/// the plain `{sessionId, progress, complete}` shape on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum JobEvent {
    Progress(ProgressEvent),
    Status(JobStatusEvent),
}

impl JobEvent {
    pub fn session_id(&self) -> &str {
        match self {
            JobEvent::Progress(e) => &e.session_id,
            JobEvent::Status(e) => &e.session_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Progress(ProgressEvent { complete: true, .. }))
    }
}
