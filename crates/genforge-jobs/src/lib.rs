//! GenForge job layer: multi-round generation orchestration.
//!
//! A submitted job runs generate → validate → repair rounds on its own
//! tokio task, bounded by a (dynamically extensible) round budget and
//! cut short when consecutive rounds fail with the same error
//! signature. Progress streams live over a per-job broadcast channel;
//! every read surface is access-checked against the job's owner/tenant.

pub mod access;
pub mod config;
pub mod error;
pub mod generator;
pub mod job;
pub mod log_stream;
pub mod orchestrator;
pub mod round_memory;
pub mod scaffold;
pub mod store;

pub use access::{can_access, Caller};
pub use config::JobConfig;
pub use error::{JobError, Result};
pub use generator::{CodeGenerator, GenerationContext};
pub use job::{Job, JobStatus};
pub use log_stream::{LogEntry, LogLevel, LogRole, LogStreamHub};
pub use orchestrator::{JobOrchestrator, SubmitOptions};
pub use scaffold::ScaffoldGenerator;
