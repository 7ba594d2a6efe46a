//! Error types for the GenForge core engine.

use thiserror::Error;

/// Errors produced by the core scoring and repair layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The artifact scorer itself failed (infrastructure, not a low score).
    ///
    /// Deliberately distinct from a failed validation verdict: a broken
    /// scorer must not be read as "the code scored zero".
    #[error("artifact scorer unavailable: {0}")]
    ScorerUnavailable(String),

    /// The generation collaborator failed to produce artifacts.
    #[error("generation failed: {0}")]
    Generation(String),

    /// A referenced artifact was not found.
    #[error("artifact not found: {name}")]
    ArtifactNotFound { name: String },

    /// Serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, CoreError>;
