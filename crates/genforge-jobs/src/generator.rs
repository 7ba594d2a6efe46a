//! Generation collaborator contract.
//!
//! The actual prompt/template machinery lives outside this workspace;
//! the orchestrator only needs something that turns a requirement plus
//! round context into an artifact set. [`crate::scaffold`] provides the
//! built-in deterministic implementation.

use async_trait::async_trait;
use genforge_core::domain::artifact::{Artifact, GenerationOutput};
use uuid::Uuid;

/// Everything a generator gets to see for one round.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub job_id: Uuid,
    pub requirement: String,
    pub round: u32,
    /// Once locked, the structural contract (and the schema in
    /// particular) must not be regenerated from scratch.
    pub contract_locked: bool,
    /// The frozen schema artifact, present when the contract is locked.
    pub frozen_schema: Option<Artifact>,
    /// Validation issues from the previous round, for corrective
    /// regeneration.
    pub previous_issues: Vec<String>,
}

#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, ctx: &GenerationContext) -> genforge_core::Result<GenerationOutput>;
}
