//! GenForge core: scoring and rule-based repair for generated code.
//!
//! This crate owns the single-unit quality loop:
//!
//! 1. [`scorer::HeuristicScorer`] grades one generated unit 0..=100 across
//!    syntax, structure and logic levels and emits marker-prefixed
//!    diagnostics.
//! 2. [`domain::classify`] turns those diagnostics into typed issues.
//! 3. [`autofix::RepairOrchestrator`] selects and applies
//!    [`autofix::FixStrategy`] implementations until the unit passes or
//!    the iteration budget runs out.
//!
//! Job-level orchestration (rounds, log streaming, access control) lives
//! in `genforge-jobs`; asynchronous multi-target validation lives in
//! `genforge-validate`. Both build on the types here.

pub mod autofix;
pub mod domain;
pub mod error_signature;
pub mod lang;
pub mod scorer;
pub mod telemetry;

pub use autofix::{FixStrategy, RepairOrchestrator, RepairOutcome};
pub use domain::{CoreError, Issue, IssueCategory, IssueSeverity, Result};
pub use scorer::{ArtifactScorer, HeuristicScorer, ScoreReport, QUALITY_PASS_THRESHOLD};
