//! Asynchronous build-check task model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default target matrix checked by a full-stack validation.
pub const DEFAULT_TARGETS: [&str; 5] = ["web", "android", "ios", "wechat", "harmony"];

/// Lifecycle of one background validation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Result for a single target, recorded in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResult {
    pub target: String,
    pub passed: bool,
    pub detail: String,
    pub duration_ms: u64,
}

/// One background validation task. Owned by the registry; the worker
/// holding the task id is the only writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTask {
    pub id: String,
    pub status: TaskStatus,
    /// 0..=100, advancing in equal per-target increments.
    pub progress: u8,
    pub targets: Vec<String>,
    pub results: Vec<TargetResult>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl BuildTask {
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            id: new_task_id(),
            status: TaskStatus::Pending,
            progress: 0,
            targets,
            results: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }
}

/// Handle returned to the caller at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTicket {
    pub task_id: String,
    pub targets: Vec<String>,
}

/// Short, log-friendly task id: `validate-` plus the first eight hex
/// characters of a v4 uuid.
fn new_task_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("validate-{}", &uuid[..8])
}
