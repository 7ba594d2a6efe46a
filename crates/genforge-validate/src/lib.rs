//! GenForge validation: tiered checks over generated artifact sets.
//!
//! - Tier A ([`tier_a`]) scores each code unit through the core
//!   heuristic scorer; never short-circuits.
//! - Tier B ([`tier_b`]) checks cross-artifact consistency with fixed
//!   per-category penalties.
//! - Tier C ([`tier_c`]) runs asynchronous multi-target build checks on
//!   a bounded worker pool, tracked in an in-memory task registry.
//!
//! [`pipeline::ValidationPipeline`] bundles the synchronous tiers; the
//! job orchestrator in `genforge-jobs` drives all three.

pub mod error;
pub mod pipeline;
pub mod pool;
pub mod registry;
pub mod task;
pub mod tier_a;
pub mod tier_b;
pub mod tier_c;
pub mod verdict;

pub use error::{Result, ValidateError};
pub use pipeline::{PipelineReport, ValidationPipeline};
pub use registry::{TaskLookup, TaskRegistry};
pub use task::{BuildTask, TargetResult, TaskStatus, TaskTicket, DEFAULT_TARGETS};
pub use tier_c::{AsyncValidator, BuildBackend, ProgressSink, ProgressUpdate, SimulatedBackend};
pub use verdict::TierVerdict;
