use anyhow::anyhow;
use async_channel::{Receiver, SendError, Sender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::common::error::{AppError, AppResult};
use crate::modules::upload::model::{JobState, UploadJob};
use crate::modules::upload::pipeline::UploadPipeline;
use crate::modules::video::model::Video;

/// A job waiting for a worker, plus the channel its uploader waits on.
pub struct QueuedJob {
    pub job: UploadJob,
    pub reply: oneshot::Sender<AppResult<Video>>,
}

/// Bounded hand-off between upload handlers and the transcoder workers.
/// When the queue is full, submitters wait for a slot.
#[derive(Clone)]
pub struct TranscodeQueue {
    sender: Sender<QueuedJob>,
    pipeline: UploadPipeline,
}

impl TranscodeQueue {
    pub fn new(pipeline: UploadPipeline, capacity: usize) -> (Self, Receiver<QueuedJob>) {
        let (sender, receiver) = async_channel::bounded(capacity.max(1));
        (Self { sender, pipeline }, receiver)
    }

    pub fn pipeline(&self) -> &UploadPipeline {
        &self.pipeline
    }

    /// Enqueues a job and waits for its outcome.
    ///
    /// The enqueue runs on its own task: if the caller is dropped mid-wait the
    /// job still reaches a worker and its files are still cleaned up.
    pub async fn submit(&self, mut job: UploadJob) -> AppResult<Video> {
        self.pipeline.announce(&mut job, JobState::Queued);

        let (reply, outcome) = oneshot::channel();
        let sender = self.sender.clone();
        let pipeline = self.pipeline.clone();

        tokio::spawn(async move {
            if let Err(SendError(queued)) = sender.send(QueuedJob { job, reply }).await {
                let err = pipeline.abandon(queued.job, "transcode queue closed").await;
                let _ = queued.reply.send(Err(err));
            }
        });

        outcome
            .await
            .map_err(|_| AppError::Internal(anyhow!("Transcode worker dropped the job")))?
    }
}

/// Spawns `workers` consumers on the queue. At most that many encodes run at
/// once; each worker handles its jobs one after another.
pub fn start_transcoder_workers(
    pipeline: UploadPipeline,
    receiver: Receiver<QueuedJob>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let workers = workers.max(1);
    info!("🎥 Starting {} transcoder worker(s)...", workers);

    (0..workers)
        .map(|id| tokio::spawn(run_worker(id, pipeline.clone(), receiver.clone())))
        .collect()
}

async fn run_worker(id: usize, pipeline: UploadPipeline, receiver: Receiver<QueuedJob>) {
    info!("🎥 Transcoder worker {} listening", id);

    while let Ok(QueuedJob { job, reply }) = receiver.recv().await {
        let session_id = job.session_id.clone();
        info!("📦 Worker {} received job for session {}", id, session_id);

        let result = pipeline.run(job).await;
        match &result {
            Ok(video) => info!("✅ Session {} completed as {}", session_id, video.file_name),
            Err(e) => error!("❌ Session {} failed: {}", session_id, e),
        }

        if reply.send(result).is_err() {
            warn!("Uploader for session {} went away before the job finished", session_id);
        }
    }

    info!("Transcoder worker {} stopped", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::upload::events::JobEvent;
    use crate::modules::upload::hub::ProgressHub;
    use crate::modules::upload::pipeline::testing::{FakeCatalog, FakeEncoder};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn job_in(dir: &std::path::Path, name: &str) -> UploadJob {
        let raw = dir.join(format!("{}.mov", name));
        std::fs::write(&raw, b"raw").unwrap();
        UploadJob::new(
            raw,
            dir.join(format!("{}.mp4", name)),
            name.to_string(),
            None,
            Uuid::new_v4(),
            name.to_string(),
        )
    }

    fn queue_with(encoder: FakeEncoder, catalog: Arc<FakeCatalog>, capacity: usize) -> (TranscodeQueue, Receiver<QueuedJob>) {
        let pipeline = UploadPipeline::new(Arc::new(encoder), catalog, ProgressHub::new());
        TranscodeQueue::new(pipeline, capacity)
    }

    #[tokio::test]
    async fn submitted_job_is_queued_then_processed() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::default());
        let (queue, receiver) = queue_with(FakeEncoder::new(Some(10.0), &[], true), catalog.clone(), 2);
        let mut rx = queue.pipeline().hub().subscribe("first");
        start_transcoder_workers(queue.pipeline().clone(), receiver, 1);

        let video = queue.submit(job_in(dir.path(), "first")).await.unwrap();
        assert_eq!(video.file_name, "first.mp4");
        assert_eq!(catalog.rows.lock().unwrap().len(), 1);

        match rx.recv().await.unwrap() {
            JobEvent::Status(s) => assert_eq!(s.state, JobState::Queued),
            other => panic!("expected QUEUED first, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn single_worker_drains_jobs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(FakeCatalog::default());
        let mut encoder = FakeEncoder::new(Some(10.0), &[], true);
        encoder.delay = Duration::from_millis(20);
        let (queue, receiver) = queue_with(encoder, catalog.clone(), 1);
        start_transcoder_workers(queue.pipeline().clone(), receiver, 1);

        let (a, b, c) = tokio::join!(
            queue.submit(job_in(dir.path(), "a")),
            queue.submit(job_in(dir.path(), "b")),
            queue.submit(job_in(dir.path(), "c")),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(catalog.rows.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn closed_queue_fails_the_job_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let (queue, receiver) = queue_with(
            FakeEncoder::new(Some(10.0), &[], true),
            Arc::new(FakeCatalog::default()),
            1,
        );
        drop(receiver);

        let job = job_in(dir.path(), "orphan");
        let raw = job.raw_file_path.clone();

        let err = queue.submit(job).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!raw.exists());
    }
}
