//! Job orchestrator configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Round budget for a job unless the submitter overrides it.
    pub default_max_rounds: u32,
    /// How far beyond its base budget a job's `max_rounds` may ever grow
    /// through dynamic extension.
    pub max_round_extension: u32,
    /// Worker count for the asynchronous build-check pool.
    pub validation_workers: usize,
    /// Per-job broadcast buffer; slow log subscribers past this lag drop
    /// entries.
    pub log_buffer: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            default_max_rounds: 3,
            max_round_extension: 3,
            validation_workers: 4,
            log_buffer: 256,
        }
    }
}
