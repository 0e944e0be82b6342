use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod middleware;
mod modules;
mod routes;
mod state;
mod workers;

use config::settings::AppConfig;
use infrastructure::db::pool::{connect_to_db, run_migrations};
use infrastructure::storage::local::MediaStorage;
use modules::upload::encoder::FfmpegEncoder;
use modules::upload::hub::ProgressHub;
use modules::upload::pipeline::UploadPipeline;
use modules::video::catalog::PgVideoCatalog;
use state::AppState;
use workers::transcoder::{start_transcoder_workers, TranscodeQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("clipshare=info,tower_http=info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("DATABASE_URL and JWT_SECRET must be set")?;

    let db = connect_to_db(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    run_migrations(&db).await.context("Failed to run migrations")?;

    let storage = MediaStorage::new(config.media_dir.clone(), config.upload_tmp_dir.clone())
        .await
        .context("Failed to prepare media directories")?;

    let pipeline = UploadPipeline::new(
        Arc::new(FfmpegEncoder::new(&config.ffmpeg_path, &config.ffprobe_path)),
        Arc::new(PgVideoCatalog::new(db.clone())),
        ProgressHub::new(),
    );
    let (queue, receiver) = TranscodeQueue::new(pipeline.clone(), config.transcode_queue_capacity);
    start_transcoder_workers(pipeline, receiver, config.transcode_workers);

    let port = config.server_port;
    let state = AppState::new(config, db, storage, queue);
    let app = app::create_app(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
