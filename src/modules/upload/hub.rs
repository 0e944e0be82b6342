use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::debug;

use super::events::JobEvent;

const TOPIC_CAPACITY: usize = 64;

struct Topic {
    sender: broadcast::Sender<JobEvent>,
    /// Jobs started on this session that have not published their terminal
    /// event yet.
    active_jobs: usize,
}

impl Topic {
    fn new() -> Self {
        Self {
            sender: broadcast::channel(TOPIC_CAPACITY).0,
            active_jobs: 0,
        }
    }
}

/// Per-session publish/subscribe for upload progress.
///
/// A listener subscribes to one session id and only ever sees that session's
/// events. Delivery is at-most-once: nothing is buffered for listeners that
/// arrive after an event was published. Several jobs may share a session id;
/// the topic closes once the last of them has finished.
#[derive(Clone, Default)]
pub struct ProgressHub {
    topics: Arc<Mutex<HashMap<String, Topic>>>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<String, Topic>> {
        // A poisoned map is still structurally valid; keep serving.
        self.topics.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<JobEvent> {
        self.topics()
            .entry(session_id.to_string())
            .or_insert_with(Topic::new)
            .sender
            .subscribe()
    }

    /// Registers a job on `session_id`. Every call must be matched by one
    /// terminal event for that session.
    pub fn begin_job(&self, session_id: &str) {
        let mut topics = self.topics();
        let topic = topics
            .entry(session_id.to_string())
            .or_insert_with(Topic::new);
        topic.active_jobs += 1;
        debug!(session_id = %session_id, active_jobs = topic.active_jobs, "Job registered on session");
    }

    /// Sends to the event's own topic. A terminal event ends one job; the
    /// topic closes once no job is left on it, so subscribers drain what is
    /// left and then see the channel end.
    pub fn publish(&self, event: JobEvent) {
        let mut topics = self.topics();
        let session_id = event.session_id().to_string();
        let terminal = event.is_terminal();

        let Some(topic) = topics.get_mut(&session_id) else {
            return;
        };

        // Err only means nobody is listening right now.
        let delivered = topic.sender.send(event).unwrap_or(0);
        debug!(session_id = %session_id, delivered, "Published job event");

        if terminal {
            topic.active_jobs = topic.active_jobs.saturating_sub(1);
            if topic.active_jobs == 0 {
                topics.remove(&session_id);
            }
        }
    }

    /// Drops the topic when its last listener has gone and no job is running
    /// on it.
    pub fn release(&self, session_id: &str) {
        let mut topics = self.topics();
        if topics
            .get(session_id)
            .is_some_and(|topic| topic.sender.receiver_count() == 0 && topic.active_jobs == 0)
        {
            topics.remove(session_id);
        }
    }

    pub fn topic_count(&self) -> usize {
        self.topics().len()
    }
}
