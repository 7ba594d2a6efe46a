//! Job entity and its state machine.
//!
//! `Pending -> Running -> {Completed | Failed}`. The round counter only
//! advances; `max_rounds` may grow through [`Job::extend_rounds`] but
//! never shrinks and never passes the extension cap; the structural
//! contract locks exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub requirement: String,
    pub status: JobStatus,
    pub current_round: u32,
    pub max_rounds: u32,
    /// The budget the job was submitted with; extensions are measured
    /// against this, not against the already-extended value.
    pub base_max_rounds: u32,
    pub contract_locked: bool,
    pub owner_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(
        requirement: impl Into<String>,
        owner_id: Option<Uuid>,
        tenant_id: Option<Uuid>,
        max_rounds: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            requirement: requirement.into(),
            status: JobStatus::Pending,
            current_round: 0,
            max_rounds,
            base_max_rounds: max_rounds,
            contract_locked: false,
            owner_id,
            tenant_id,
            last_error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
        self.current_round = 1;
    }

    pub fn advance_round(&mut self) {
        self.current_round += 1;
    }

    /// Grow the round budget by `extra`, capped at the base budget plus
    /// `cap`. Returns how many rounds were actually granted.
    pub fn extend_rounds(&mut self, extra: u32, cap: u32) -> u32 {
        let ceiling = self.base_max_rounds + cap;
        let new_max = (self.max_rounds + extra).min(ceiling).max(self.max_rounds);
        let granted = new_max - self.max_rounds;
        self.max_rounds = new_max;
        granted
    }

    /// One-way transition; locking an already-locked contract is a no-op.
    pub fn lock_contract(&mut self) {
        self.contract_locked = true;
    }

    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.last_error = Some(reason.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new("order management", None, None, 3)
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(!job.is_terminal());

        job.start();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.current_round, 1);
        assert!(job.started_at.is_some());

        job.complete();
        assert!(job.is_terminal());
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_failure_records_reason() {
        let mut job = job();
        job.start();
        job.fail("generator exploded");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.last_error.as_deref(), Some("generator exploded"));
    }

    #[test]
    fn test_extension_is_capped_at_base_plus_limit() {
        let mut job = job();
        assert_eq!(job.extend_rounds(1, 3), 1);
        assert_eq!(job.max_rounds, 4);
        assert_eq!(job.extend_rounds(10, 3), 2);
        assert_eq!(job.max_rounds, 6);
        // Fully extended: further requests grant nothing.
        assert_eq!(job.extend_rounds(1, 3), 0);
        assert_eq!(job.max_rounds, 6);
    }

    #[test]
    fn test_extension_never_shrinks() {
        let mut job = job();
        job.extend_rounds(3, 3);
        let before = job.max_rounds;
        assert_eq!(job.extend_rounds(0, 3), 0);
        assert_eq!(job.max_rounds, before);
    }

    #[test]
    fn test_contract_lock_is_one_way() {
        let mut job = job();
        assert!(!job.contract_locked);
        job.lock_contract();
        job.lock_contract();
        assert!(job.contract_locked);
    }
}
