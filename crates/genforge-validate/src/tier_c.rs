//! Tier C: asynchronous full-stack build checks.
//!
//! Submission returns immediately with a ticket; a pool worker then walks
//! the ordered target list, recording one [`TargetResult`] per target and
//! advancing progress in equal increments (exactly 20/40/60/80/100 for
//! the default five-target matrix). Callers poll [`AsyncValidator::query`]
//! for snapshots and may pass a [`ProgressSink`] for push-style updates.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{Result, ValidateError};
use crate::pool::WorkerPool;
use crate::registry::{TaskLookup, TaskRegistry};
use crate::task::{BuildTask, TargetResult, TaskStatus, TaskTicket, DEFAULT_TARGETS};

/// Push-style progress notification, one per completed target.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub task_id: String,
    pub target: String,
    pub progress: u8,
    pub passed: bool,
}

/// Callback invoked from the worker after each target completes.
pub type ProgressSink = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Builds one target. The simulated backend is the default; a sandboxed
/// real build slots in behind the same trait.
#[async_trait]
pub trait BuildBackend: Send + Sync {
    async fn build(&self, task_id: &str, target: &str) -> Result<TargetResult>;
}

/// Deterministic stand-in backend with configurable latency and
/// per-target failure injection.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    latency: Duration,
    failing: HashSet<String>,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failing: HashSet::new(),
        }
    }

    /// Make `target` fail its build.
    pub fn fail_on(mut self, target: impl Into<String>) -> Self {
        self.failing.insert(target.into());
        self
    }
}

#[async_trait]
impl BuildBackend for SimulatedBackend {
    async fn build(&self, task_id: &str, target: &str) -> Result<TargetResult> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        if self.failing.contains(target) {
            return Err(ValidateError::Backend {
                target: target.to_string(),
                message: format!("simulated build failure for task {}", task_id),
            });
        }
        Ok(TargetResult {
            target: target.to_string(),
            passed: true,
            detail: "simulated build passed".to_string(),
            duration_ms: self.latency.as_millis() as u64,
        })
    }
}

struct BuildJob {
    task_id: String,
    targets: Vec<String>,
    sink: Option<ProgressSink>,
}

/// Front end of the tier: owns the registry and the worker pool.
pub struct AsyncValidator {
    registry: Arc<TaskRegistry>,
    pool: WorkerPool<BuildJob>,
}

impl AsyncValidator {
    pub fn new(backend: Arc<dyn BuildBackend>, workers: usize) -> Self {
        let registry = Arc::new(TaskRegistry::new());
        let pool = {
            let registry = Arc::clone(&registry);
            WorkerPool::new(workers, 64, move |job: BuildJob| {
                let registry = Arc::clone(&registry);
                let backend = Arc::clone(&backend);
                async move { run_task(registry, backend, job).await }
            })
        };
        Self { registry, pool }
    }

    /// Register a task and enqueue it. Returns as soon as the task is
    /// queued; `None` targets means the default target matrix.
    pub async fn submit(
        &self,
        targets: Option<Vec<String>>,
        sink: Option<ProgressSink>,
    ) -> Result<TaskTicket> {
        let targets = targets
            .unwrap_or_else(|| DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect());
        let task = BuildTask::new(targets.clone());
        let ticket = TaskTicket {
            task_id: task.id.clone(),
            targets: targets.clone(),
        };

        info!(task_id = %ticket.task_id, target_count = targets.len(), "submitting build task");
        self.registry.insert(task);
        self.pool
            .submit(BuildJob {
                task_id: ticket.task_id.clone(),
                targets,
                sink,
            })
            .await?;
        Ok(ticket)
    }

    /// Snapshot of a task, or a typed not-found sentinel.
    pub fn query(&self, task_id: &str) -> TaskLookup {
        self.registry.lookup(task_id)
    }
}

async fn run_task(registry: Arc<TaskRegistry>, backend: Arc<dyn BuildBackend>, job: BuildJob) {
    let BuildJob {
        task_id,
        targets,
        sink,
    } = job;

    registry.update(&task_id, |t| t.status = TaskStatus::Running);
    let total = targets.len().max(1);

    for (index, target) in targets.iter().enumerate() {
        match backend.build(&task_id, target).await {
            Ok(result) => {
                let progress = (((index + 1) * 100) / total) as u8;
                let passed = result.passed;
                registry.update(&task_id, |t| {
                    t.results.push(result.clone());
                    t.progress = progress;
                });
                if let Some(sink) = &sink {
                    sink(ProgressUpdate {
                        task_id: task_id.clone(),
                        target: target.clone(),
                        progress,
                        passed,
                    });
                }
            }
            Err(err) => {
                warn!(task_id = %task_id, target = %target, error = %err, "build task failed");
                registry.update(&task_id, |t| {
                    t.status = TaskStatus::Failed;
                    t.error = Some(err.to_string());
                    t.completed_at = Some(Utc::now());
                });
                return;
            }
        }
    }

    info!(task_id = %task_id, "build task completed");
    registry.update(&task_id, |t| {
        t.status = TaskStatus::Completed;
        t.progress = 100;
        t.completed_at = Some(Utc::now());
    });
}
