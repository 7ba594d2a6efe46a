//! Error types for the validation pipeline.

use thiserror::Error;

/// Errors produced by the tiered validation layer.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A build backend failed for one target. Captured into the owning
    /// task rather than propagated out of the worker.
    #[error("build failed for target {target}: {message}")]
    Backend { target: String, message: String },

    /// The task queue is closed or full; the submission was not accepted.
    #[error("validation task could not be enqueued: {0}")]
    QueueClosed(String),

    /// Error bubbled up from the core scoring layer.
    #[error(transparent)]
    Core(#[from] genforge_core::CoreError),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, ValidateError>;
