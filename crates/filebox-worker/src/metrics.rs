//! Prometheus metrics for the worker.

use std::net::{Ipv4Addr, SocketAddr};

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Metric names as constants for consistency.
pub mod names {
    pub const THUMBNAIL_TASKS_TOTAL: &str = "filebox_thumbnail_tasks_total";
    pub const QUEUE_TRANSPORT_ERRORS_TOTAL: &str = "filebox_queue_transport_errors_total";
}

/// Outcome label for tasks that finished every stage.
pub const OUTCOME_COMPLETED: &str = "completed";
/// Outcome label for runs that panicked inside the pipeline.
pub const OUTCOME_PANICKED: &str = "panicked";

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Must be called from within a Tokio runtime.
pub fn install_exporter(port: u16) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        .install()
}

/// Record a finished task. Failed tasks are labelled with their error kind.
pub fn record_task(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::THUMBNAIL_TASKS_TOTAL, &labels).increment(1);
}

pub fn record_queue_transport_error() {
    counter!(names::QUEUE_TRANSPORT_ERRORS_TOTAL).increment(1);
}
