//! Demo error types.

use domain::DomainError;
use thiserror::Error;

/// Anything that stops the demo run.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Failed to render output: {0}")]
    Json(#[from] serde_json::Error),

    /// A racing writer task panicked or was cancelled.
    #[error("Writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}
