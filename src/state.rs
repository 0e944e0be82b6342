use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::storage::local::MediaStorage;
use crate::modules::upload::hub::ProgressHub;
use crate::workers::transcoder::TranscodeQueue;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub storage: MediaStorage,
    pub progress: ProgressHub,
    pub transcoder: TranscodeQueue,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        storage: MediaStorage,
        transcoder: TranscodeQueue,
    ) -> Self {
        // Listeners and the pipeline must share one hub.
        let progress = transcoder.pipeline().hub().clone();
        Self {
            config,
            db,
            storage,
            progress,
            transcoder,
        }
    }
}
