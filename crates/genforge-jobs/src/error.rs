//! Error types for the job layer.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job not found: {job_id}")]
    NotFound { job_id: Uuid },

    /// The caller is not allowed to read this job.
    #[error("access denied for job {job_id}")]
    AccessDenied { job_id: Uuid },

    #[error("artifact not found: {artifact_id} in job {job_id}")]
    ArtifactNotFound { job_id: Uuid, artifact_id: Uuid },

    #[error(transparent)]
    Core(#[from] genforge_core::CoreError),

    #[error(transparent)]
    Validate(#[from] genforge_validate::ValidateError),
}

pub type Result<T> = std::result::Result<T, JobError>;
