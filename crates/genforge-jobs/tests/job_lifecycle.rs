//! End-to-end tests of the job round loop, access control and log
//! streaming.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use genforge_core::domain::artifact::{Artifact, ArtifactKind, GenerationOutput};
use genforge_core::CoreError;
use genforge_jobs::{
    Caller, CodeGenerator, GenerationContext, Job, JobConfig, JobError, JobOrchestrator,
    JobStatus, LogRole, ScaffoldGenerator, SubmitOptions,
};
use genforge_validate::registry::TaskLookup;
use genforge_validate::task::TaskStatus;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

const GOOD_SERVICE: &str = r#"package com.genforge.generated.service;

public class OrderService {
    private final OrderRepository orderRepository;

    public Order find(String id) {
        if (id == null) {
            throw new IllegalArgumentException("id required");
        }
        return orderRepository.findById(id);
    }
}
"#;

const GOOD_CONTROLLER: &str = r#"package com.genforge.generated.controller;

public class OrderController {
    private OrderService service;

    public Order get(String id) {
        if (id == null) {
            throw new IllegalArgumentException("id required");
        }
        return service.find(id);
    }
}
"#;

const GOOD_ENTITY: &str = r#"package com.genforge.generated.entity;

public class Order {
    private String id;

    public String getId() {
        return id;
    }
}
"#;

fn entity() -> Artifact {
    Artifact::new("Order.java", ArtifactKind::Entity, GOOD_ENTITY)
}

fn service() -> Artifact {
    Artifact::new("OrderService.java", ArtifactKind::Service, GOOD_SERVICE)
}

fn controller() -> Artifact {
    Artifact::new("OrderController.java", ArtifactKind::Controller, GOOD_CONTROLLER)
}

fn schema() -> Artifact {
    Artifact::new("schema.sql", ArtifactKind::Schema, "CREATE TABLE orders ();")
}

/// A service unit with a dropped closing brace and no package line.
fn broken_service() -> Artifact {
    let broken = GOOD_SERVICE
        .replace("package com.genforge.generated.service;\n\n", "")
        .trim_end()
        .trim_end_matches('}')
        .to_string();
    Artifact::new("OrderService.java", ArtifactKind::Service, broken)
}

struct FailingGenerator;

#[async_trait]
impl CodeGenerator for FailingGenerator {
    async fn generate(&self, _ctx: &GenerationContext) -> genforge_core::Result<GenerationOutput> {
        Err(CoreError::Generation("model unavailable".to_string()))
    }
}

/// Always forgets the controller; Tier B fails the same way each round.
struct MissingControllerGenerator;

#[async_trait]
impl CodeGenerator for MissingControllerGenerator {
    async fn generate(&self, _ctx: &GenerationContext) -> genforge_core::Result<GenerationOutput> {
        Ok(GenerationOutput {
            artifacts: vec![entity(), service(), schema()],
        })
    }
}

/// First round emits a repairable service unit, later rounds a good one.
struct BrokenServiceGenerator;

#[async_trait]
impl CodeGenerator for BrokenServiceGenerator {
    async fn generate(&self, _ctx: &GenerationContext) -> genforge_core::Result<GenerationOutput> {
        Ok(GenerationOutput {
            artifacts: vec![entity(), broken_service(), controller(), schema()],
        })
    }
}

/// Cycles through three distinct Tier B failures so the error signature
/// changes every round and the job keeps earning extensions until the
/// cap.
struct CyclingGenerator {
    calls: AtomicU32,
}

#[async_trait]
impl CodeGenerator for CyclingGenerator {
    async fn generate(&self, _ctx: &GenerationContext) -> genforge_core::Result<GenerationOutput> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let artifacts = match call % 3 {
            0 => vec![entity(), service(), schema()],
            1 => vec![service(), controller(), schema()],
            _ => vec![entity(), service(), controller()],
        };
        Ok(GenerationOutput { artifacts })
    }
}

async fn wait_for_terminal(orchestrator: &JobOrchestrator, job_id: Uuid) -> Job {
    let caller = Caller::anonymous();
    for _ in 0..400 {
        if let Ok(job) = orchestrator.get_job(&caller, job_id) {
            if job.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} never reached a terminal state");
}

#[tokio::test]
async fn scaffold_job_completes_in_the_first_round() -> anyhow::Result<()> {
    genforge_core::telemetry::init_for_tests();
    let orchestrator = JobOrchestrator::new(JobConfig::default(), Arc::new(ScaffoldGenerator::new()));
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());

    let job = wait_for_terminal(&orchestrator, job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.current_round, 1);
    assert!(job.contract_locked);
    assert!(job.last_error.is_none());

    let artifacts = orchestrator.get_artifacts(&Caller::anonymous(), job_id)?;
    assert_eq!(artifacts.len(), 4);
    let content =
        orchestrator.get_artifact_content(&Caller::anonymous(), job_id, artifacts[0].id)?;
    assert!(!content.is_empty());
    Ok(())
}

#[tokio::test]
async fn log_stream_reports_progress_and_closes_on_completion() {
    let orchestrator = JobOrchestrator::new(JobConfig::default(), Arc::new(ScaffoldGenerator::new()));
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());
    // Current-thread runtime: the job task has not run yet, so this
    // subscription sees the stream from the beginning.
    let mut rx = orchestrator.subscribe_logs(&Caller::anonymous(), job_id).unwrap();

    let mut messages = Vec::new();
    loop {
        match rx.recv().await {
            Ok(entry) => messages.push(entry.message),
            Err(RecvError::Closed) => break,
            Err(RecvError::Lagged(_)) => continue,
        }
    }

    assert!(messages.iter().any(|m| m.contains("job started")));
    assert!(messages.iter().any(|m| m.contains("structural contract locked")));
    assert!(messages.iter().any(|m| m.contains("job completed")));
}

#[tokio::test]
async fn repairable_unit_is_fixed_and_the_job_completes() {
    let orchestrator = JobOrchestrator::new(JobConfig::default(), Arc::new(BrokenServiceGenerator));
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());

    let job = wait_for_terminal(&orchestrator, job_id).await;
    assert_eq!(job.status, JobStatus::Completed, "error: {:?}", job.last_error);

    // The persisted service unit carries the repaired content.
    let artifacts = orchestrator.get_artifacts(&Caller::anonymous(), job_id).unwrap();
    let service = artifacts
        .iter()
        .find(|a| a.kind == ArtifactKind::Service)
        .unwrap();
    assert_ne!(service.content, broken_service().content);
    let opens = service.content.matches('{').count();
    let closes = service.content.matches('}').count();
    assert_eq!(opens, closes);
}

#[tokio::test]
async fn generator_error_fails_the_job() {
    let orchestrator = JobOrchestrator::new(JobConfig::default(), Arc::new(FailingGenerator));
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());

    let job = wait_for_terminal(&orchestrator, job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    let error = job.last_error.unwrap();
    assert!(error.contains("generation failed"));
    assert!(error.contains("model unavailable"));
}

#[tokio::test]
async fn repeated_failure_signature_stops_the_job_early() {
    let orchestrator =
        JobOrchestrator::new(JobConfig::default(), Arc::new(MissingControllerGenerator));
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());

    let job = wait_for_terminal(&orchestrator, job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.last_error.unwrap().contains("repeated failure signature"));
    // Two identical failures are enough; the budget is not exhausted.
    assert_eq!(job.current_round, 2);
}

#[tokio::test]
async fn changing_signatures_extend_the_budget_up_to_the_cap() {
    let generator = Arc::new(CyclingGenerator {
        calls: AtomicU32::new(0),
    });
    let orchestrator = JobOrchestrator::new(JobConfig::default(), generator);
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());

    let job = wait_for_terminal(&orchestrator, job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.last_error.unwrap().contains("round budget exhausted"));
    // Base budget 3, extension cap +3; the counter never passes the
    // (extended) budget.
    assert_eq!(job.base_max_rounds, 3);
    assert_eq!(job.max_rounds, 6);
    assert_eq!(job.current_round, 6);
}

#[tokio::test]
async fn round_budget_override_is_honoured() {
    let orchestrator =
        JobOrchestrator::new(JobConfig::default(), Arc::new(MissingControllerGenerator));
    let job_id = orchestrator.submit_job(
        "order management",
        SubmitOptions {
            max_rounds: Some(1),
            ..SubmitOptions::default()
        },
    );

    let job = wait_for_terminal(&orchestrator, job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.max_rounds, 1);
    // The terminal snapshot stays inside the budget it ran out of.
    assert_eq!(job.current_round, 1);
    assert!(job.last_error.unwrap().contains("round budget exhausted"));
}

#[tokio::test]
async fn access_control_guards_every_read_surface() {
    let owner = Uuid::new_v4();
    let tenant = Uuid::new_v4();
    let orchestrator = JobOrchestrator::new(JobConfig::default(), Arc::new(ScaffoldGenerator::new()));
    let job_id = orchestrator.submit_job(
        "order management",
        SubmitOptions {
            owner_id: Some(owner),
            tenant_id: Some(tenant),
            max_rounds: None,
        },
    );
    wait_for_terminal_as(&orchestrator, job_id, Caller::user(owner)).await;

    // Owner and tenant peers read; strangers and anonymous callers do not.
    assert!(orchestrator.get_job(&Caller::user(owner), job_id).is_ok());
    assert!(orchestrator
        .get_job(&Caller::user(Uuid::new_v4()).with_tenant(tenant), job_id)
        .is_ok());
    for caller in [Caller::anonymous(), Caller::user(Uuid::new_v4())] {
        assert!(matches!(
            orchestrator.get_job(&caller, job_id),
            Err(JobError::AccessDenied { .. })
        ));
        assert!(orchestrator.subscribe_logs(&caller, job_id).is_err());
        assert!(orchestrator.get_artifacts(&caller, job_id).is_err());
        assert!(orchestrator
            .submit_async_validation(&caller, job_id, None)
            .await
            .is_err());
    }

    assert!(matches!(
        orchestrator.get_job(&Caller::anonymous(), Uuid::new_v4()),
        Err(JobError::NotFound { .. })
    ));
}

async fn wait_for_terminal_as(orchestrator: &JobOrchestrator, job_id: Uuid, caller: Caller) -> Job {
    for _ in 0..400 {
        if let Ok(job) = orchestrator.get_job(&caller, job_id) {
            if job.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} never reached a terminal state");
}

#[tokio::test]
async fn async_validation_streams_executor_progress() {
    let orchestrator = JobOrchestrator::new(JobConfig::default(), Arc::new(ScaffoldGenerator::new()));
    let job_id = orchestrator.submit_job("order management", SubmitOptions::default());
    wait_for_terminal(&orchestrator, job_id).await;

    let mut rx = orchestrator.subscribe_logs(&Caller::anonymous(), job_id).unwrap();
    let ticket = orchestrator
        .submit_async_validation(
            &Caller::anonymous(),
            job_id,
            Some(vec!["web".to_string(), "ios".to_string()]),
        )
        .await
        .unwrap();

    let mut finished = false;
    for _ in 0..400 {
        if let TaskLookup::Found { task } = orchestrator.query_async_validation(&ticket.task_id) {
            if task.status.is_terminal() {
                assert_eq!(task.status, TaskStatus::Completed);
                assert_eq!(task.results.len(), 2);
                finished = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(finished, "build task never reached a terminal state");

    // One executor log entry per finished target.
    for _ in 0..2 {
        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.role, LogRole::Executor);
        assert!(entry.message.contains("build check"));
    }
}
