//! Thumbnail worker binary.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use filebox_db::{DbConfig, SqlxMaterialRepository};
use filebox_media::FfmpegTranscoder;
use filebox_queue::RedisTaskQueue;
use filebox_storage::S3ObjectStore;
use filebox_worker::{metrics, ThumbnailPipeline, ThumbnailWorker, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("filebox=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting filebox-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Some(port) = config.metrics_port {
        match metrics::install_exporter(port) {
            Ok(()) => info!("Prometheus exporter listening on port {}", port),
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    }

    let queue = match RedisTaskQueue::from_env() {
        Ok(q) => {
            info!("Consuming thumbnail tasks from '{}'", q.queue_name());
            q
        }
        Err(e) => {
            error!("Failed to create task queue: {}", e);
            std::process::exit(1);
        }
    };

    let store = match S3ObjectStore::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create object store: {}", e);
            std::process::exit(1);
        }
    };

    let repo = match DbConfig::from_env() {
        Ok(db_config) => match SqlxMaterialRepository::connect(&db_config).await {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Invalid database config: {}", e);
            std::process::exit(1);
        }
    };

    let transcoder = FfmpegTranscoder::new(config.ffmpeg_path.clone());
    if let Err(e) = transcoder.check() {
        // Tasks fail individually until ffmpeg is installed.
        warn!("FFmpeg not available: {}", e);
    }

    let pipeline = Arc::new(ThumbnailPipeline::new(
        Arc::new(store),
        Arc::new(repo),
        Arc::new(transcoder),
        config.scratch_dir.clone(),
    ));
    let worker = ThumbnailWorker::new(config, Arc::new(queue), pipeline);

    tokio::select! {
        _ = worker.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Worker shutdown complete");
}
