//! The iterative repair loop: score, select, apply, re-score.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{classify_all, Issue, Result};
use crate::scorer::{ArtifactScorer, QUALITY_PASS_THRESHOLD};

use super::{select_strategies, FixStrategy};

/// Circuit breaker: one iteration per strategy family is enough, anything
/// past three is churn.
pub const MAX_FIX_ITERATIONS: u32 = 3;

/// Why a repair run stopped without reaching the pass threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No registered strategy supports the open issues.
    NoApplicableStrategy,
    /// The selected strategy ran but produced byte-identical code.
    StrategyDidNotChangeCode,
    /// The iteration budget ran out before the score crossed the bar.
    MaxIterationsReached,
}

/// One iteration of the repair loop, for diagnostics and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixHistoryEntry {
    pub iteration: u32,
    pub score_before: u8,
    /// Score measured at the start of the following iteration; `None`
    /// until that re-validation happens.
    pub score_after: Option<u8>,
    pub issues_found: Vec<Issue>,
    /// Name of the strategy that ran, if one was selected.
    pub strategy_applied: Option<String>,
    pub changed: bool,
    pub duration_ms: u64,
}

/// Final result of a repair run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub success: bool,
    /// The best-scoring candidate seen across all iterations. On failure
    /// this can be an earlier candidate than the last one produced.
    pub final_code: String,
    pub final_score: u8,
    pub iterations: u32,
    pub failure: Option<FailureReason>,
    pub history: Vec<FixHistoryEntry>,
    pub total_duration_ms: u64,
}

/// Drives validation and repair for a single generated unit.
///
/// One strategy per iteration: the lowest-priority-number strategy that
/// supports the open issues runs, then the loop re-validates. Three
/// iterations cover the three strategy families in the worst case.
pub struct RepairOrchestrator<S: ArtifactScorer> {
    scorer: S,
    strategies: Vec<Box<dyn FixStrategy>>,
}

impl<S: ArtifactScorer> RepairOrchestrator<S> {
    pub fn new(scorer: S, strategies: Vec<Box<dyn FixStrategy>>) -> Self {
        Self { scorer, strategies }
    }

    /// Build an orchestrator with the built-in strategy set.
    pub fn with_builtin_strategies(scorer: S) -> Self {
        Self::new(scorer, super::builtin_strategies())
    }

    /// Run the repair loop on one unit.
    ///
    /// Scorer failures propagate as errors rather than being folded into
    /// a zero score; a broken scorer must not steer the loop.
    pub fn attempt_repair(&self, initial_code: &str, unit_name: &str) -> Result<RepairOutcome> {
        info!(
            unit = %unit_name,
            code_len = initial_code.len(),
            "starting repair loop"
        );

        let started = Instant::now();
        let mut current = initial_code.to_string();
        let mut history: Vec<FixHistoryEntry> = Vec::new();
        let mut best_score = 0u8;
        let mut best_code = current.clone();
        let mut iteration = 0;

        while iteration < MAX_FIX_ITERATIONS {
            iteration += 1;
            let iteration_started = Instant::now();

            let report = self.scorer.score(&current, unit_name)?;
            let score = report.quality_score;
            if let Some(last) = history.last_mut() {
                last.score_after = Some(score);
            }
            // Strict improvement only: on a tie the earliest candidate
            // wins, so repairs that add noise without raising the score
            // never displace it.
            if score > best_score {
                best_score = score;
                best_code = current.clone();
            }

            info!(
                unit = %unit_name,
                iteration,
                score,
                issue_count = report.issues.len(),
                "validated candidate"
            );

            if report.success && score >= QUALITY_PASS_THRESHOLD {
                history.push(FixHistoryEntry {
                    iteration,
                    score_before: score,
                    score_after: Some(score),
                    issues_found: Vec::new(),
                    strategy_applied: None,
                    changed: false,
                    duration_ms: elapsed_ms(iteration_started),
                });
                return Ok(RepairOutcome {
                    success: true,
                    final_code: current,
                    final_score: score,
                    iterations: iteration,
                    failure: None,
                    history,
                    total_duration_ms: elapsed_ms(started),
                });
            }

            let issues = classify_all(&report.issues);
            let selected = select_strategies(&self.strategies, &issues);

            let Some(strategy) = selected.first() else {
                warn!(unit = %unit_name, iteration, "no applicable repair strategy");
                history.push(FixHistoryEntry {
                    iteration,
                    score_before: score,
                    score_after: Some(score),
                    issues_found: issues,
                    strategy_applied: None,
                    changed: false,
                    duration_ms: elapsed_ms(iteration_started),
                });
                return Ok(self.failed(
                    FailureReason::NoApplicableStrategy,
                    best_code,
                    best_score,
                    iteration,
                    history,
                    started,
                ));
            };

            debug!(
                unit = %unit_name,
                strategy = strategy.name(),
                priority = strategy.priority(),
                "applying repair strategy"
            );
            let fixed = strategy.apply(&current, &issues);

            if fixed == current {
                warn!(
                    unit = %unit_name,
                    iteration,
                    strategy = strategy.name(),
                    "repair strategy left code unchanged"
                );
                history.push(FixHistoryEntry {
                    iteration,
                    score_before: score,
                    score_after: Some(score),
                    issues_found: issues,
                    strategy_applied: Some(strategy.name().to_string()),
                    changed: false,
                    duration_ms: elapsed_ms(iteration_started),
                });
                return Ok(self.failed(
                    FailureReason::StrategyDidNotChangeCode,
                    best_code,
                    best_score,
                    iteration,
                    history,
                    started,
                ));
            }

            history.push(FixHistoryEntry {
                iteration,
                score_before: score,
                score_after: None,
                issues_found: issues,
                strategy_applied: Some(strategy.name().to_string()),
                changed: true,
                duration_ms: elapsed_ms(iteration_started),
            });
            current = fixed;
        }

        // Budget exhausted; score the last candidate so the outcome and
        // the trailing history entry carry a real number.
        let final_report = self.scorer.score(&current, unit_name)?;
        if let Some(last) = history.last_mut() {
            last.score_after = Some(final_report.quality_score);
        }
        if final_report.quality_score > best_score {
            best_score = final_report.quality_score;
            best_code = current;
        }

        warn!(
            unit = %unit_name,
            final_score = best_score,
            "iteration budget exhausted without passing"
        );
        Ok(self.failed(
            FailureReason::MaxIterationsReached,
            best_code,
            best_score,
            MAX_FIX_ITERATIONS,
            history,
            started,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn failed(
        &self,
        reason: FailureReason,
        best_code: String,
        best_score: u8,
        iterations: u32,
        history: Vec<FixHistoryEntry>,
        started: Instant,
    ) -> RepairOutcome {
        RepairOutcome {
            success: false,
            final_code: best_code,
            final_score: best_score,
            iterations,
            failure: Some(reason),
            history,
            total_duration_ms: elapsed_ms(started),
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
