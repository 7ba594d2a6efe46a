//! Synchronous validation pipeline: Tier A then Tier B.
//!
//! Both tiers always run — Tier B's consistency findings are wanted even
//! when Tier A already failed, because the job orchestrator feeds the
//! combined issue list into error-signature computation.

use genforge_core::domain::artifact::GenerationOutput;
use genforge_core::scorer::ArtifactScorer;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::tier_a::{self, TierAReport};
use crate::tier_b;
use crate::verdict::TierVerdict;

/// Combined result of the synchronous tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub passed: bool,
    pub tier_a: TierAReport,
    pub tier_b: TierVerdict,
}

impl PipelineReport {
    /// All issues from both tiers, in tier order. The input to
    /// round-level error-signature computation.
    pub fn combined_issues(&self) -> Vec<String> {
        let mut issues = self.tier_a.verdict.issues.clone();
        issues.extend(self.tier_b.issues.iter().cloned());
        issues
    }
}

/// Runs the synchronous tiers over a generation output.
pub struct ValidationPipeline<S: ArtifactScorer> {
    scorer: S,
}

impl<S: ArtifactScorer> ValidationPipeline<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn run(&self, output: &GenerationOutput) -> Result<PipelineReport> {
        let tier_a = tier_a::run(&self.scorer, output)?;
        let tier_b = tier_b::run(output);
        let passed = tier_a.verdict.passed && tier_b.passed;

        info!(
            tier_a_score = tier_a.verdict.score,
            tier_b_score = tier_b.score,
            passed,
            "validation pipeline finished"
        );
        Ok(PipelineReport {
            passed,
            tier_a,
            tier_b,
        })
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }
}
