use std::sync::Arc;
use tracing::{error, info, warn};

use super::encoder::Encoder;
use super::events::{JobEvent, JobStatusEvent, ProgressEvent};
use super::hub::ProgressHub;
use super::model::{JobState, UploadJob};
use crate::common::error::{AppError, AppResult};
use crate::infrastructure::storage::local::{move_file, remove_quietly};
use crate::modules::video::catalog::VideoCatalog;
use crate::modules::video::model::{NewVideo, Video};

/// Probe, encode, finalize. One `run` per job; jobs never share state other
/// than the hub.
#[derive(Clone)]
pub struct UploadPipeline {
    encoder: Arc<dyn Encoder>,
    catalog: Arc<dyn VideoCatalog>,
    hub: ProgressHub,
}

impl UploadPipeline {
    pub fn new(encoder: Arc<dyn Encoder>, catalog: Arc<dyn VideoCatalog>, hub: ProgressHub) -> Self {
        Self { encoder, catalog, hub }
    }

    pub fn hub(&self) -> &ProgressHub {
        &self.hub
    }

    /// Moves the job to `state` and tells its listeners. Leaving `Pending`
    /// registers the job on its session topic.
    pub fn announce(&self, job: &mut UploadJob, state: JobState) {
        if job.state == JobState::Pending {
            self.hub.begin_job(&job.session_id);
        }
        job.advance(state);
        self.hub.publish(JobEvent::Status(JobStatusEvent {
            session_id: job.session_id.clone(),
            state,
        }));
    }

    /// The single terminal event of a job.
    fn publish_finished(&self, job: &UploadJob) {
        self.hub
            .publish(JobEvent::Progress(ProgressEvent::finished(&job.session_id)));
    }

    /// Fails a job that never reached a worker.
    pub async fn abandon(&self, mut job: UploadJob, reason: &str) -> AppError {
        warn!(session_id = %job.session_id, "Abandoning upload job: {}", reason);
        remove_quietly(&job.raw_file_path).await;
        remove_quietly(&job.encode_file_path).await;
        self.announce(&mut job, JobState::Failed);
        self.publish_finished(&job);
        AppError::Internal(anyhow::anyhow!("Upload could not be processed: {}", reason))
    }

    pub async fn run(&self, mut job: UploadJob) -> AppResult<Video> {
        self.announce(&mut job, JobState::Probing);
        job.total_duration_seconds = self.encoder.probe_duration(&job.raw_file_path).await;
        if job.total_duration_seconds.is_none() {
            warn!(session_id = %job.session_id, "Duration unknown, progress will not be reported");
        }

        self.announce(&mut job, JobState::Encoding);
        let raw = job.raw_file_path.clone();
        let staged = job.encode_file_path.clone();

        let encoded = {
            let hub = &self.hub;
            let job = &mut job;
            let mut on_line = |line: &str| {
                if let Some(event) = job.observe_line(line) {
                    hub.publish(JobEvent::Progress(event));
                }
            };
            self.encoder.encode(&raw, &staged, &mut on_line).await
        };

        remove_quietly(&raw).await;

        if let Err(e) = encoded {
            error!(session_id = %job.session_id, "Encoding failed: {}", e);
            remove_quietly(&staged).await;
            self.finish(&mut job, JobState::Failed);
            return Err(AppError::Encoding(e.to_string()));
        }

        let published = self.publish_output(&job).await;
        match &published {
            Ok(video) => {
                info!(session_id = %job.session_id, video_id = %video.id, file_name = %video.file_name, "Upload published");
                self.finish(&mut job, JobState::Succeeded);
            }
            Err(e) => {
                error!(session_id = %job.session_id, "Publishing encoded output failed: {}", e);
                self.finish(&mut job, JobState::Failed);
            }
        }
        published
    }

    /// Moves the encoded file into the media directory and records it. On
    /// error neither the staged nor the published file is left behind.
    async fn publish_output(&self, job: &UploadJob) -> AppResult<Video> {
        if let Err(e) = move_file(&job.encode_file_path, &job.output_file_path).await {
            remove_quietly(&job.encode_file_path).await;
            remove_quietly(&job.output_file_path).await;
            return Err(AppError::Internal(anyhow::anyhow!(
                "Failed to publish encoded file: {}",
                e
            )));
        }

        let record = NewVideo {
            creator_id: job.creator_id,
            title: job.title.clone(),
            description: job.description.clone(),
            file_name: job.output_file_name.clone(),
        };

        let inserted = self.catalog.insert_video(record).await;
        if inserted.is_err() {
            remove_quietly(&job.output_file_path).await;
        }
        inserted
    }

    /// Final status, then the terminal progress event.
    fn finish(&self, job: &mut UploadJob, state: JobState) {
        self.announce(job, state);
        self.publish_finished(job);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process stand-ins for the encoder and the catalog.

    use super::*;
    use crate::modules::upload::encoder::EncodeError;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use time::OffsetDateTime;
    use uuid::Uuid;

    pub struct FakeEncoder {
        pub duration: Option<f64>,
        pub lines: Vec<String>,
        pub exit_ok: bool,
        pub delay: Duration,
    }

    impl FakeEncoder {
        pub fn new(duration: Option<f64>, lines: &[&str], exit_ok: bool) -> Self {
            Self {
                duration,
                lines: lines.iter().map(|l| l.to_string()).collect(),
                exit_ok,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl Encoder for FakeEncoder {
        async fn probe_duration(&self, _input: &Path) -> Option<f64> {
            self.duration
        }

        async fn encode(
            &self,
            _input: &Path,
            output: &Path,
            on_line: &mut (dyn for<'a> FnMut(&'a str) + Send),
        ) -> Result<(), EncodeError> {
            tokio::fs::write(output, b"partial").await?;
            for line in &self.lines {
                on_line(line);
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.exit_ok {
                Ok(())
            } else {
                Err(EncodeError::Exit("exit code 1".to_string()))
            }
        }
    }

    #[derive(Default)]
    pub struct FakeCatalog {
        pub fail: bool,
        pub rows: Mutex<Vec<Video>>,
    }

    #[async_trait]
    impl VideoCatalog for FakeCatalog {
        async fn insert_video(&self, video: NewVideo) -> AppResult<Video> {
            if self.fail {
                return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
            }
            let row = Video {
                id: Uuid::new_v4(),
                creator_id: video.creator_id,
                title: video.title,
                description: video.description,
                file_name: video.file_name,
                created_at: OffsetDateTime::now_utc(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeCatalog, FakeEncoder};
    use super::*;
    use std::path::Path;
    use tokio::sync::broadcast;
    use uuid::Uuid;

    struct Fixture {
        _dir: tempfile::TempDir,
        job: UploadJob,
    }

    async fn fixture(session: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.mov");
        tokio::fs::write(&raw, b"raw bytes").await.unwrap();
        let mut job = UploadJob::new(
            raw,
            dir.path().join("clip.mp4"),
            "My clip".into(),
            Some("desc".into()),
            Uuid::new_v4(),
            session.into(),
        );
        // Workers receive jobs already queued.
        job.state = JobState::Queued;
        Fixture { _dir: dir, job }
    }

    fn drain(rx: &mut broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    fn progress_of(events: &[JobEvent]) -> Vec<(u8, bool)> {
        events
            .iter()
            .filter_map(|e| match e {
                JobEvent::Progress(p) => Some((p.progress, p.complete)),
                JobEvent::Status(_) => None,
            })
            .collect()
    }

    fn states_of(events: &[JobEvent]) -> Vec<JobState> {
        events
            .iter()
            .filter_map(|e| match e {
                JobEvent::Status(s) => Some(s.state),
                JobEvent::Progress(_) => None,
            })
            .collect()
    }

    fn pipeline(encoder: FakeEncoder, catalog: Arc<FakeCatalog>) -> UploadPipeline {
        UploadPipeline::new(Arc::new(encoder), catalog, ProgressHub::new())
    }

    #[tokio::test]
    async fn successful_job_reports_progress_and_publishes_record() {
        let Fixture { _dir, job } = fixture("s-ok").await;
        let raw = job.raw_file_path.clone();
        let staged = job.encode_file_path.clone();
        let output = job.output_file_path.clone();

        let catalog = Arc::new(FakeCatalog::default());
        let encoder = FakeEncoder::new(
            Some(120.0),
            &["Press [q] to stop", "frame=1 time=00:01:00.00 bitrate=1k", "frame=2 time=00:01:12.00 bitrate=1k"],
            true,
        );
        let pipeline = pipeline(encoder, catalog.clone());
        let mut rx = pipeline.hub().subscribe("s-ok");

        let video = pipeline.run(job).await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(progress_of(&events), vec![(50, false), (60, false), (100, true)]);
        assert_eq!(
            states_of(&events),
            vec![JobState::Probing, JobState::Encoding, JobState::Succeeded]
        );

        let rows = catalog.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].file_name, "clip.mp4");
        assert_eq!(video.file_name, "clip.mp4");
        assert_eq!(rows[0].title, "My clip");

        assert!(!raw.exists());
        assert!(!staged.exists());
        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"partial");
    }

    #[tokio::test]
    async fn unknown_duration_only_emits_terminal_event() {
        let Fixture { _dir, job } = fixture("s-unknown").await;
        let encoder = FakeEncoder::new(None, &["time=00:00:10.00", "time=00:00:20.00"], true);
        let pipeline = pipeline(encoder, Arc::new(FakeCatalog::default()));
        let mut rx = pipeline.hub().subscribe("s-unknown");

        pipeline.run(job).await.unwrap();

        assert_eq!(progress_of(&drain(&mut rx)), vec![(100, true)]);
    }

    #[tokio::test]
    async fn encoder_failure_removes_files_and_skips_catalog() {
        let Fixture { _dir, job } = fixture("s-fail").await;
        let raw = job.raw_file_path.clone();
        let staged = job.encode_file_path.clone();
        let output = job.output_file_path.clone();

        let catalog = Arc::new(FakeCatalog::default());
        let encoder = FakeEncoder::new(Some(10.0), &["time=00:00:05.00"], false);
        let pipeline = pipeline(encoder, catalog.clone());
        let mut rx = pipeline.hub().subscribe("s-fail");

        let err = pipeline.run(job).await.unwrap_err();
        assert!(matches!(err, AppError::Encoding(_)));

        let events = drain(&mut rx);
        assert_eq!(progress_of(&events), vec![(50, false), (100, true)]);
        assert_eq!(states_of(&events).last(), Some(&JobState::Failed));

        assert!(catalog.rows.lock().unwrap().is_empty());
        assert!(!raw.exists());
        assert!(!staged.exists());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn catalog_failure_removes_output() {
        let Fixture { _dir, job } = fixture("s-db").await;
        let raw = job.raw_file_path.clone();
        let staged = job.encode_file_path.clone();
        let output = job.output_file_path.clone();

        let catalog = Arc::new(FakeCatalog { fail: true, ..Default::default() });
        let pipeline = pipeline(FakeEncoder::new(Some(10.0), &[], true), catalog);
        let mut rx = pipeline.hub().subscribe("s-db");

        let err = pipeline.run(job).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        let events = drain(&mut rx);
        assert_eq!(progress_of(&events), vec![(100, true)]);
        assert_eq!(
            states_of(&events),
            vec![JobState::Probing, JobState::Encoding, JobState::Failed]
        );
        assert!(matches!(events.last(), Some(JobEvent::Progress(p)) if p.complete));
        assert!(!raw.exists());
        assert!(!staged.exists());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn other_sessions_see_nothing() {
        let Fixture { _dir, job } = fixture("mine").await;
        let pipeline = pipeline(
            FakeEncoder::new(Some(10.0), &["time=00:00:05.00"], true),
            Arc::new(FakeCatalog::default()),
        );
        let mut theirs = pipeline.hub().subscribe("theirs");

        pipeline.run(job).await.unwrap();

        assert!(drain(&mut theirs).is_empty());
    }

    #[tokio::test]
    async fn abandoned_job_cleans_up_and_terminates() {
        let Fixture { _dir, job } = fixture("s-abandon").await;
        let raw = job.raw_file_path.clone();
        let pipeline = pipeline(FakeEncoder::new(None, &[], true), Arc::new(FakeCatalog::default()));
        let mut rx = pipeline.hub().subscribe("s-abandon");

        let err = pipeline.abandon(job, "queue closed").await;

        assert!(matches!(err, AppError::Internal(_)));
        assert!(!Path::new(&raw).exists());
        let events = drain(&mut rx);
        assert_eq!(states_of(&events), vec![JobState::Failed]);
        assert_eq!(progress_of(&events), vec![(100, true)]);
    }

    #[tokio::test]
    async fn status_follows_the_catalog_outcome() {
        let Fixture { _dir, job } = fixture("s-order").await;
        let pipeline = pipeline(
            FakeEncoder::new(Some(10.0), &[], true),
            Arc::new(FakeCatalog::default()),
        );
        let mut rx = pipeline.hub().subscribe("s-order");

        pipeline.run(job).await.unwrap();

        let events = drain(&mut rx);
        let n = events.len();
        assert!(matches!(&events[n - 2], JobEvent::Status(s) if s.state == JobState::Succeeded));
        assert!(matches!(&events[n - 1], JobEvent::Progress(p) if p.complete));
    }

    #[tokio::test]
    async fn jobs_sharing_a_session_keep_the_topic_open() {
        let first = fixture("shared").await;
        let second = fixture("shared").await;
        let pipeline = pipeline(
            FakeEncoder::new(Some(10.0), &["time=00:00:05.00"], true),
            Arc::new(FakeCatalog::default()),
        );
        let mut rx = pipeline.hub().subscribe("shared");

        let mut a = first.job;
        let mut b = second.job;
        a.state = JobState::Pending;
        b.state = JobState::Pending;
        pipeline.announce(&mut a, JobState::Queued);
        pipeline.announce(&mut b, JobState::Queued);

        pipeline.run(a).await.unwrap();
        pipeline.run(b).await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(
            progress_of(&events),
            vec![(50, false), (100, true), (50, false), (100, true)]
        );
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Closed)));
        assert_eq!(pipeline.hub().topic_count(), 0);
    }
}
