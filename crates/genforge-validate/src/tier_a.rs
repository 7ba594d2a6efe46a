//! Tier A: per-unit quality scoring.
//!
//! Every generated unit is scored independently through the core
//! [`ArtifactScorer`]; one bad unit never hides the reports of the
//! others. The tier passes only when every unit passes, and its score is
//! the integer mean of the unit scores.

use genforge_core::domain::artifact::{ArtifactKind, GenerationOutput};
use genforge_core::scorer::{ArtifactScorer, ScoreReport};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::verdict::TierVerdict;

pub const TIER_A_NAME: &str = "unit-quality";

/// One unit's score, kept alongside the aggregate verdict so the job
/// orchestrator can repair exactly the units that failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub unit_name: String,
    pub report: ScoreReport,
}

/// Aggregate verdict plus the per-unit detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierAReport {
    pub verdict: TierVerdict,
    pub units: Vec<UnitReport>,
}

impl TierAReport {
    /// Units that fell below the pass threshold.
    pub fn failing_units(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| !u.report.success)
    }
}

/// Score every business-logic unit in the generation output. Never
/// short-circuits: a unit failure is recorded and scoring continues.
///
/// The quality heuristics encode service-layer expectations (injected
/// dependencies, control flow, exception handling), so entity beans and
/// the schema script are not scored here; their presence is Tier B's
/// concern.
pub fn run(scorer: &dyn ArtifactScorer, output: &GenerationOutput) -> Result<TierAReport> {
    if output.artifacts.is_empty() {
        return Ok(TierAReport {
            verdict: TierVerdict::fail(
                TIER_A_NAME,
                0,
                vec!["no artifacts to validate".to_string()],
            ),
            units: Vec::new(),
        });
    }

    let mut units = Vec::with_capacity(output.artifacts.len());
    let mut all_passed = true;
    let mut score_sum: u32 = 0;
    let mut issues = Vec::new();

    for artifact in output.artifacts.iter().filter(|a| {
        matches!(
            a.kind,
            ArtifactKind::Service | ArtifactKind::Controller | ArtifactKind::Other
        )
    }) {
        let report = scorer.score(&artifact.content, &artifact.name)?;
        all_passed &= report.success;
        score_sum += u32::from(report.quality_score);
        for issue in &report.issues {
            issues.push(format!("{}: {}", artifact.name, issue));
        }
        units.push(UnitReport {
            unit_name: artifact.name.clone(),
            report,
        });
    }

    if units.is_empty() {
        return Ok(TierAReport {
            verdict: TierVerdict::fail(
                TIER_A_NAME,
                0,
                vec!["no code units to validate".to_string()],
            ),
            units,
        });
    }

    let average = (score_sum / units.len() as u32) as u8;
    info!(
        unit_count = units.len(),
        average,
        all_passed,
        "unit quality tier finished"
    );

    let verdict = if all_passed {
        TierVerdict::pass(TIER_A_NAME, average)
    } else {
        TierVerdict::fail(TIER_A_NAME, average, issues)
    };
    Ok(TierAReport { verdict, units })
}

#[cfg(test)]
mod tests {
    use super::*;
    use genforge_core::domain::artifact::{Artifact, ArtifactKind};
    use genforge_core::scorer::HeuristicScorer;

    const GOOD_UNIT: &str = r#"package com.genforge.generated.service;

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

    fn output(artifacts: Vec<Artifact>) -> GenerationOutput {
        GenerationOutput { artifacts }
    }

    #[test]
    fn test_all_units_pass() {
        let out = output(vec![
            Artifact::new("OrderService.java", ArtifactKind::Service, GOOD_UNIT),
            Artifact::new(
                "UserService.java",
                ArtifactKind::Service,
                GOOD_UNIT.replace("Order", "User"),
            ),
        ]);
        let report = run(&HeuristicScorer::new(), &out).unwrap();
        assert!(report.verdict.passed);
        assert_eq!(report.units.len(), 2);
        assert_eq!(report.failing_units().count(), 0);
    }

    #[test]
    fn test_one_bad_unit_fails_the_tier_but_all_are_scored() {
        let out = output(vec![
            Artifact::new("OrderService.java", ArtifactKind::Service, GOOD_UNIT),
            Artifact::new("Broken.java", ArtifactKind::Service, "int x = 1;"),
        ]);
        let report = run(&HeuristicScorer::new(), &out).unwrap();
        assert!(!report.verdict.passed);
        // Both units were scored despite the failure.
        assert_eq!(report.units.len(), 2);
        let failing: Vec<_> = report.failing_units().map(|u| u.unit_name.as_str()).collect();
        assert_eq!(failing, vec!["Broken.java"]);
        // Issues are prefixed with the offending unit name.
        assert!(report.verdict.issues.iter().all(|i| i.starts_with("Broken.java: ")));
    }

    #[test]
    fn test_average_is_integer_mean() {
        let out = output(vec![
            Artifact::new("OrderService.java", ArtifactKind::Service, GOOD_UNIT),
            Artifact::new("Broken.java", ArtifactKind::Service, "int x = 1;"),
        ]);
        let report = run(&HeuristicScorer::new(), &out).unwrap();
        let expected = (u32::from(report.units[0].report.quality_score)
            + u32::from(report.units[1].report.quality_score))
            / 2;
        assert_eq!(u32::from(report.verdict.score), expected);
    }

    #[test]
    fn test_empty_output_fails_with_zero() {
        let report = run(&HeuristicScorer::new(), &output(vec![])).unwrap();
        assert!(!report.verdict.passed);
        assert_eq!(report.verdict.score, 0);
        assert!(report.units.is_empty());
    }
}
