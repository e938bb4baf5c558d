//! Worker loop.

use std::any::Any;
use std::sync::Arc;

use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use filebox_models::ThumbnailTask;
use filebox_queue::TaskQueue;

use crate::config::WorkerConfig;
use crate::error::ErrorKind;
use crate::logging::TaskLogger;
use crate::metrics;
use crate::pipeline::{TaskOutcome, ThumbnailPipeline};

/// What a single iteration of the worker loop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStep {
    /// The pop timed out on an empty queue.
    Idle,
    /// A task ran through the pipeline.
    Processed(TaskOutcome),
    /// A payload could not be decoded and was discarded.
    Dropped,
    /// The queue was unreachable; the worker slept before returning.
    Backoff,
    /// The pipeline panicked; the panic was contained.
    Recovered,
}

/// Single sequential consumer of the thumbnail queue.
pub struct ThumbnailWorker {
    config: WorkerConfig,
    queue: Arc<dyn TaskQueue>,
    pipeline: Arc<ThumbnailPipeline>,
    worker_name: String,
}

impl ThumbnailWorker {
    pub fn new(
        config: WorkerConfig,
        queue: Arc<dyn TaskQueue>,
        pipeline: Arc<ThumbnailPipeline>,
    ) -> Self {
        let worker_name = format!("worker-{}", Uuid::new_v4());
        Self {
            config,
            queue,
            pipeline,
            worker_name,
        }
    }

    /// Drain the queue forever.
    ///
    /// Never returns on its own; stop it by dropping the future.
    pub async fn run(&self) {
        info!(
            "Starting thumbnail worker '{}' (pop timeout {:?}, backoff {:?})",
            self.worker_name, self.config.pop_timeout, self.config.idle_backoff
        );

        loop {
            self.tick().await;
        }
    }

    /// Pop at most one task and handle it.
    pub async fn tick(&self) -> LoopStep {
        match self.queue.pop_blocking(self.config.pop_timeout).await {
            Ok(None) => LoopStep::Idle,
            Ok(Some(task)) => self.execute(task).await,
            Err(e) if e.is_transport() => {
                error!(
                    "Queue unavailable, retrying in {:?}: {}",
                    self.config.idle_backoff, e
                );
                metrics::record_queue_transport_error();
                tokio::time::sleep(self.config.idle_backoff).await;
                LoopStep::Backoff
            }
            Err(e) => {
                warn!("Dropping undecodable task: {}", e);
                metrics::record_task(ErrorKind::Serialization.as_str());
                LoopStep::Dropped
            }
        }
    }

    /// Run the pipeline in its own task so a panic stays inside it.
    async fn execute(&self, task: ThumbnailTask) -> LoopStep {
        let logger = TaskLogger::new(&task);
        let span = logger.create_span();
        let pipeline = Arc::clone(&self.pipeline);

        let handle = tokio::spawn(async move { pipeline.process(&task).await }.instrument(span));

        match handle.await {
            Ok(outcome) => LoopStep::Processed(outcome),
            Err(e) if e.is_panic() => {
                logger.log_panic(&panic_message(e.into_panic()));
                metrics::record_task(metrics::OUTCOME_PANICKED);
                LoopStep::Recovered
            }
            Err(e) => {
                logger.log_warning(&format!("pipeline run cancelled: {}", e));
                LoopStep::Recovered
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
