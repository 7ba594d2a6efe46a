//! Heuristic artifact scoring.
//!
//! Scores one generated unit on a 0..=100 scale across three levels:
//! syntax (30), structure (30), logic (40). The scorer is a pure local
//! rule engine — no model calls — so a full pass stays well under a
//! millisecond. Diagnostics are emitted with the marker vocabulary from
//! [`crate::domain::issue::markers`] so the classifier and the repair
//! strategies can dispatch on them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::issue::{markers, messages};
use crate::domain::Result;
use crate::lang;

/// Score at or above which a unit passes validation.
pub const QUALITY_PASS_THRESHOLD: u8 = 70;

/// Outcome of scoring one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Whether the unit reached [`QUALITY_PASS_THRESHOLD`].
    pub success: bool,
    /// Aggregate quality score, 0..=100.
    pub quality_score: u8,
    /// Raw diagnostic lines, marker-prefixed, in emission order.
    pub issues: Vec<String>,
}

impl ScoreReport {
    pub fn passed(&self) -> bool {
        self.success
    }
}

/// Scores a single generated unit.
///
/// Implementations must treat their own failure as an error, never as a
/// zero score: a broken scorer aborts the repair loop instead of steering
/// it with garbage numbers.
pub trait ArtifactScorer: Send + Sync {
    fn score(&self, code: &str, unit_name: &str) -> Result<ScoreReport>;
}

/// The built-in rule-based scorer.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Level 1: syntax, worth 30 points.
    ///
    /// Unbalanced delimiters are a hard failure: the whole level scores
    /// zero and the remaining syntax checks are skipped, since semicolon
    /// and keyword heuristics are meaningless on structurally broken text.
    fn score_syntax(&self, code: &str, issues: &mut Vec<String>) -> u8 {
        if !lang::count_delimiters(code).is_balanced() {
            issues.push(format!(
                "{}{}",
                markers::SYNTAX_ERROR,
                messages::UNBALANCED_DELIMITERS
            ));
            return 0;
        }
        let mut score = 10;

        if semicolons_plausible(code) {
            score += 10;
        } else {
            issues.push(format!(
                "{}{}",
                markers::SYNTAX_WARNING,
                messages::MISSING_SEMICOLONS
            ));
        }

        if lang::has_misspelled_keyword(code) {
            issues.push(format!(
                "{}{}",
                markers::SYNTAX_ERROR,
                messages::MISSPELLED_KEYWORDS
            ));
        } else {
            score += 10;
        }

        score
    }

    /// Level 2: structure, worth 30 points.
    fn score_structure(&self, code: &str, issues: &mut Vec<String>) -> u8 {
        let mut score = 0;

        if lang::has_type_declaration(code) {
            score += 10;
        } else {
            issues.push(format!(
                "{}{}",
                markers::STRUCTURE_ERROR,
                messages::MISSING_CLASS
            ));
        }

        if lang::has_method_definition(code) {
            score += 10;
        } else {
            issues.push(format!(
                "{}{}",
                markers::STRUCTURE_WARNING,
                messages::MISSING_METHOD
            ));
        }

        if lang::has_package_declaration(code) {
            score += 10;
        } else {
            issues.push(format!(
                "{}{}",
                markers::STRUCTURE_WARNING,
                messages::MISSING_PACKAGE
            ));
        }

        score
    }

    /// Level 3: logic, worth 40 points.
    ///
    /// Splits into dependency reference (10), business structure (20) and
    /// exception handling (10). A dependency with no control flow around
    /// it earns half credit; exception handling without complete business
    /// logic likewise.
    fn score_logic(&self, code: &str, issues: &mut Vec<String>) -> u8 {
        let mut score = 0;

        let has_dependency = has_dependency_reference(code);
        let has_conditional = ["if", "for", "while", "switch", "case"]
            .iter()
            .any(|kw| code.contains(kw));
        let has_return_or_throw = code.contains("return") || code.contains("throw");
        let has_flow = has_conditional || has_return_or_throw;

        // Dependency reference: 10 points, halved when nothing flows
        // through it.
        if has_dependency {
            if has_flow {
                score += 10;
            } else {
                score += 5;
                issues.push(format!(
                    "{}{}",
                    markers::LOGIC_WARNING,
                    messages::DEPENDENCY_WITHOUT_FLOW
                ));
            }
        } else {
            issues.push(format!(
                "{}{}",
                markers::LOGIC_WARNING,
                messages::NO_DEPENDENCY_REFERENCE
            ));
        }

        // Business structure: 20 points, requires both an injected field
        // and some control flow.
        let has_field_declaration = code.contains("private")
            && (code.contains("Repository") || code.contains("Service"));
        let empty_body = lang::has_empty_method_body(code) && !has_flow;

        if empty_body {
            issues.push(format!(
                "{}{}",
                markers::LOGIC_ERROR,
                messages::EMPTY_METHOD_BODY
            ));
            issues.push(format!(
                "{}{}",
                markers::LOGIC_WARNING,
                messages::NO_BUSINESS_LOGIC
            ));
        } else if has_field_declaration && has_flow {
            score += 20;
        } else if has_field_declaration {
            issues.push(format!(
                "{}{}",
                markers::LOGIC_WARNING,
                messages::NO_BUSINESS_LOGIC
            ));
        } else if has_conditional && has_return_or_throw {
            issues.push(format!(
                "{}{}",
                markers::LOGIC_HINT,
                messages::MISSING_FIELD_DECLARATION
            ));
        } else {
            issues.push(format!(
                "{}{}",
                markers::LOGIC_WARNING,
                messages::NO_BUSINESS_LOGIC
            ));
        }

        // Exception handling: 10 points, halved when the surrounding
        // business logic is incomplete.
        let has_exception_handling = code.contains("try")
            || code.contains("catch")
            || code.contains("throw")
            || code.contains("Exception");
        let complete_business = has_dependency && has_flow;

        if has_exception_handling && complete_business {
            score += 10;
        } else if has_exception_handling {
            score += 5;
            issues.push(format!(
                "{}{}",
                markers::LOGIC_HINT,
                messages::INCOMPLETE_EXCEPTION_CONTEXT
            ));
        } else {
            issues.push(format!(
                "{}{}",
                markers::LOGIC_HINT,
                messages::MISSING_EXCEPTION_HANDLING
            ));
        }

        score
    }
}

impl ArtifactScorer for HeuristicScorer {
    fn score(&self, code: &str, unit_name: &str) -> Result<ScoreReport> {
        if code.trim().is_empty() {
            return Ok(ScoreReport {
                success: false,
                quality_score: 0,
                issues: vec!["code is empty, nothing to validate".to_string()],
            });
        }

        let mut issues = Vec::new();

        let syntax = self.score_syntax(code, &mut issues);
        let structure = self.score_structure(code, &mut issues);
        let logic = self.score_logic(code, &mut issues);
        let total = syntax + structure + logic;

        debug!(
            unit = %unit_name,
            syntax,
            structure,
            logic,
            total,
            issue_count = issues.len(),
            "scored unit"
        );

        Ok(ScoreReport {
            success: total >= QUALITY_PASS_THRESHOLD,
            quality_score: total,
            issues,
        })
    }
}

/// Heuristic semicolon check: a unit longer than 20 lines with fewer than
/// three semicolons has almost certainly dropped its statement terminators.
fn semicolons_plausible(code: &str) -> bool {
    let semicolons = code.chars().filter(|c| *c == ';').count();
    let lines = code.lines().count();
    !(lines > 20 && semicolons < 3)
}

/// Whether the unit references an injected repository or service, either
/// as a field declaration or through a method call.
fn has_dependency_reference(code: &str) -> bool {
    let has_repository_field = code.contains("private")
        && (code.contains("Repository") || code.contains("repository"));
    let has_service_field = code.contains("private")
        && regex_is_match(code, r"private\s+\w*Service\s+\w*service");
    let has_repository_call = regex_is_match(code, r"\w+[Rr]epository\s*\.\s*\w+");

    has_repository_field || has_service_field || has_repository_call
}

fn regex_is_match(code: &str, pattern: &str) -> bool {
    if let Ok(re) = regex::Regex::new(pattern) {
        re.is_match(code)
    } else {
        false
    }
}
