//! Job orchestrator: drives the generate → validate → repair rounds.
//!
//! One spawned tokio task per job runs the round loop synchronously;
//! every read surface goes through the access check. Progress is pushed
//! to the job's log stream, and the stream is closed when the job
//! reaches a terminal state.

use std::sync::Arc;

use genforge_core::domain::artifact::Artifact;
use genforge_core::scorer::HeuristicScorer;
use genforge_core::RepairOrchestrator;
use genforge_validate::registry::TaskLookup;
use genforge_validate::tier_c::{ProgressSink, ProgressUpdate, SimulatedBackend};
use genforge_validate::{AsyncValidator, PipelineReport, TaskTicket, ValidationPipeline};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{can_access, Caller};
use crate::config::JobConfig;
use crate::error::{JobError, Result};
use crate::generator::{CodeGenerator, GenerationContext};
use crate::job::Job;
use crate::log_stream::{LogEntry, LogLevel, LogRole, LogStreamHub};
use crate::round_memory::{RoundMemory, RoundObservation};
use crate::store::{MemoryArtifactStore, MemoryJobStore};

/// Per-submission knobs; identity is optional (anonymous jobs are
/// readable by anyone).
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    pub owner_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    /// Round budget override; `None` takes the configured default.
    pub max_rounds: Option<u32>,
}

pub struct JobOrchestrator {
    config: JobConfig,
    jobs: MemoryJobStore,
    artifacts: MemoryArtifactStore,
    logs: Arc<LogStreamHub>,
    generator: Arc<dyn CodeGenerator>,
    pipeline: ValidationPipeline<HeuristicScorer>,
    repair: RepairOrchestrator<HeuristicScorer>,
    validator: AsyncValidator,
}

impl JobOrchestrator {
    /// Must be called within a tokio runtime: the build-check worker
    /// pool spawns immediately.
    pub fn new(config: JobConfig, generator: Arc<dyn CodeGenerator>) -> Arc<Self> {
        let validator = AsyncValidator::new(
            Arc::new(SimulatedBackend::default()),
            config.validation_workers,
        );
        Arc::new(Self {
            logs: Arc::new(LogStreamHub::new(config.log_buffer)),
            config,
            jobs: MemoryJobStore::new(),
            artifacts: MemoryArtifactStore::new(),
            generator,
            pipeline: ValidationPipeline::new(HeuristicScorer::new()),
            repair: RepairOrchestrator::with_builtin_strategies(HeuristicScorer::new()),
            validator,
        })
    }

    /// Fire-and-forget submission; the round loop runs on its own task.
    pub fn submit_job(self: &Arc<Self>, requirement: impl Into<String>, options: SubmitOptions) -> Uuid {
        let job = Job::new(
            requirement,
            options.owner_id,
            options.tenant_id,
            options.max_rounds.unwrap_or(self.config.default_max_rounds),
        );
        let job_id = job.id;
        info!(job_id = %job_id, max_rounds = job.max_rounds, "job submitted");
        self.jobs.insert(job);

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.run_job(job_id).await });
        job_id
    }

    pub fn get_job(&self, caller: &Caller, job_id: Uuid) -> Result<Job> {
        self.authorize(caller, job_id)
    }

    pub fn subscribe_logs(
        &self,
        caller: &Caller,
        job_id: Uuid,
    ) -> Result<broadcast::Receiver<LogEntry>> {
        self.authorize(caller, job_id)?;
        Ok(self.logs.subscribe(job_id))
    }

    pub fn get_artifacts(&self, caller: &Caller, job_id: Uuid) -> Result<Vec<Artifact>> {
        self.authorize(caller, job_id)?;
        Ok(self
            .artifacts
            .get(job_id)
            .map(|o| o.artifacts)
            .unwrap_or_default())
    }

    pub fn get_artifact_content(
        &self,
        caller: &Caller,
        job_id: Uuid,
        artifact_id: Uuid,
    ) -> Result<String> {
        self.authorize(caller, job_id)?;
        self.artifacts
            .find_artifact(job_id, artifact_id)
            .map(|a| a.content)
            .ok_or(JobError::ArtifactNotFound { job_id, artifact_id })
    }

    /// Kick off Tier C build checks for the job's stack; per-target
    /// progress is forwarded onto the job's log stream.
    pub async fn submit_async_validation(
        &self,
        caller: &Caller,
        job_id: Uuid,
        targets: Option<Vec<String>>,
    ) -> Result<TaskTicket> {
        self.authorize(caller, job_id)?;
        let logs = Arc::clone(&self.logs);
        let sink: ProgressSink = Arc::new(move |update: ProgressUpdate| {
            let level = if update.passed {
                LogLevel::Info
            } else {
                LogLevel::Warn
            };
            logs.publish(
                job_id,
                LogEntry::new(
                    LogRole::Executor,
                    level,
                    format!(
                        "build check {}: target {} finished ({}%)",
                        update.task_id, update.target, update.progress
                    ),
                ),
            );
        });
        Ok(self.validator.submit(targets, Some(sink)).await?)
    }

    pub fn query_async_validation(&self, task_id: &str) -> TaskLookup {
        self.validator.query(task_id)
    }

    fn authorize(&self, caller: &Caller, job_id: Uuid) -> Result<Job> {
        let job = self.jobs.get(job_id).ok_or(JobError::NotFound { job_id })?;
        if !can_access(caller, &job) {
            return Err(JobError::AccessDenied { job_id });
        }
        Ok(job)
    }

    async fn run_job(self: Arc<Self>, job_id: Uuid) {
        self.jobs.update(job_id, |j| j.start());
        let Some(job) = self.jobs.get(job_id) else {
            return;
        };
        self.publish(
            job_id,
            LogRole::System,
            LogLevel::Info,
            format!("job started: {}", job.requirement),
        );

        let requirement = job.requirement;
        let mut memory = RoundMemory::new();
        let mut frozen_schema: Option<Artifact> = None;
        let mut previous_issues: Vec<String> = Vec::new();

        loop {
            let Some(job) = self.jobs.get(job_id) else {
                return;
            };
            let round = job.current_round;
            self.publish(
                job_id,
                LogRole::Architect,
                LogLevel::Info,
                format!("round {round}/{} started", job.max_rounds),
            );

            let ctx = GenerationContext {
                job_id,
                requirement: requirement.clone(),
                round,
                contract_locked: job.contract_locked,
                frozen_schema: frozen_schema.clone(),
                previous_issues: previous_issues.clone(),
            };
            let mut output = match self.generator.generate(&ctx).await {
                Ok(output) => output,
                Err(err) => {
                    self.finish_failed(job_id, format!("generation failed: {err}"));
                    return;
                }
            };

            // Under a locked contract the schema is frozen; whatever the
            // generator produced for it is replaced.
            if job.contract_locked {
                if let Some(frozen) = &frozen_schema {
                    for artifact in &mut output.artifacts {
                        if artifact.kind == frozen.kind {
                            *artifact = frozen.clone();
                        }
                    }
                }
            }
            self.artifacts.put(job_id, output.clone());
            self.publish(
                job_id,
                LogRole::Coder,
                LogLevel::Info,
                format!("round {round}: {} artifacts generated", output.artifacts.len()),
            );

            if !job.contract_locked {
                frozen_schema = output.schema().cloned();
                self.jobs.update(job_id, |j| j.lock_contract());
                self.publish(
                    job_id,
                    LogRole::System,
                    LogLevel::Info,
                    "structural contract locked",
                );
            }

            let report = match self.pipeline.run(&output) {
                Ok(report) => report,
                Err(err) => {
                    self.finish_failed(job_id, format!("validation failed to run: {err}"));
                    return;
                }
            };
            self.publish_verdicts(job_id, round, &report);

            if report.passed {
                self.finish_completed(job_id, round);
                return;
            }

            let issues = report.combined_issues();
            let (signature, observation) = memory.observe(&issues);
            previous_issues = issues;
            self.publish(
                job_id,
                LogRole::Coach,
                LogLevel::Warn,
                format!(
                    "round {round} failed validation ({} issues, signature {signature})",
                    previous_issues.len()
                ),
            );

            match observation {
                RoundObservation::Repeated => {
                    self.finish_failed(
                        job_id,
                        "repeated failure signature, no progress between rounds",
                    );
                    return;
                }
                RoundObservation::Changed if round >= job.max_rounds => {
                    let mut granted = 0;
                    let cap = self.config.max_round_extension;
                    self.jobs.update(job_id, |j| granted = j.extend_rounds(1, cap));
                    if granted > 0 {
                        self.publish(
                            job_id,
                            LogRole::System,
                            LogLevel::Info,
                            format!("error signature changed, round budget extended by {granted}"),
                        );
                    }
                }
                _ => {}
            }

            // Repair the units Tier A flagged; successful repairs go
            // straight back into the persisted set.
            let failing: Vec<String> = report
                .tier_a
                .failing_units()
                .map(|u| u.unit_name.clone())
                .collect();
            let mut repaired_any = false;
            for unit_name in &failing {
                let Some(artifact) = output.artifacts.iter_mut().find(|a| &a.name == unit_name)
                else {
                    continue;
                };
                match self.repair.attempt_repair(&artifact.content, &artifact.name) {
                    Ok(outcome) if outcome.success => {
                        self.publish(
                            job_id,
                            LogRole::Coder,
                            LogLevel::Info,
                            format!(
                                "repaired {} in {} iteration(s), score {}",
                                unit_name, outcome.iterations, outcome.final_score
                            ),
                        );
                        artifact.content = outcome.final_code;
                        repaired_any = true;
                    }
                    Ok(_) => {
                        self.publish(
                            job_id,
                            LogRole::Coach,
                            LogLevel::Warn,
                            format!("automatic repair could not fix {unit_name}"),
                        );
                    }
                    Err(err) => {
                        self.finish_failed(job_id, format!("repair aborted: {err}"));
                        return;
                    }
                }
            }

            if repaired_any {
                self.artifacts.put(job_id, output.clone());
                let report = match self.pipeline.run(&output) {
                    Ok(report) => report,
                    Err(err) => {
                        self.finish_failed(job_id, format!("validation failed to run: {err}"));
                        return;
                    }
                };
                self.publish_verdicts(job_id, round, &report);
                if report.passed {
                    self.finish_completed(job_id, round);
                    return;
                }
                previous_issues = report.combined_issues();
            } else if !failing.is_empty() {
                self.finish_failed(job_id, "could not auto-repair failing units");
                return;
            }

            // Exhaustion is decided before the counter moves, so a
            // terminal snapshot never shows current_round past the
            // budget. Re-read the job: an extension above may have
            // raised max_rounds this round.
            let Some(job) = self.jobs.get(job_id) else {
                return;
            };
            if round >= job.max_rounds {
                self.finish_failed(job_id, "round budget exhausted");
                return;
            }
            self.jobs.update(job_id, |j| j.advance_round());
        }
    }

    fn publish(&self, job_id: Uuid, role: LogRole, level: LogLevel, message: impl Into<String>) {
        self.logs.publish(job_id, LogEntry::new(role, level, message));
    }

    fn publish_verdicts(&self, job_id: Uuid, round: u32, report: &PipelineReport) {
        self.publish(
            job_id,
            LogRole::Coach,
            LogLevel::Info,
            format!(
                "round {round} validation: {} {} ({}), {} {} ({})",
                report.tier_a.verdict.tier_name,
                if report.tier_a.verdict.passed { "passed" } else { "failed" },
                report.tier_a.verdict.score,
                report.tier_b.tier_name,
                if report.tier_b.passed { "passed" } else { "failed" },
                report.tier_b.score,
            ),
        );
    }

    fn finish_completed(&self, job_id: Uuid, round: u32) {
        info!(job_id = %job_id, round, "job completed");
        self.jobs.update(job_id, |j| j.complete());
        self.publish(
            job_id,
            LogRole::System,
            LogLevel::Success,
            format!("job completed in round {round}"),
        );
        self.logs.close(job_id);
    }

    fn finish_failed(&self, job_id: Uuid, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(job_id = %job_id, reason = %reason, "job failed");
        {
            let reason = reason.clone();
            self.jobs.update(job_id, |j| j.fail(reason));
        }
        self.publish(job_id, LogRole::System, LogLevel::Error, reason);
        self.logs.close(job_id);
    }
}
