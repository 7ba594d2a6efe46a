//! Rule-based repair strategies and the iterative repair loop.
//!
//! Each strategy owns one problem family and declares a fixed priority:
//! syntax (1) before structure (2) before logic (3), because structural
//! and logical repairs assume the text is at least delimiter-balanced.
//! Strategies are conservative: they only add or correct, never delete
//! caller code, and applying one twice is a no-op.

mod logic;
mod orchestrator;
mod structure;
mod syntax;

pub use logic::LogicRepair;
pub use orchestrator::{
    FailureReason, FixHistoryEntry, RepairOrchestrator, RepairOutcome, MAX_FIX_ITERATIONS,
};
pub use structure::{StructureRepair, DEFAULT_PACKAGE};
pub use syntax::SyntaxRepair;

use crate::domain::Issue;

/// One repair strategy for a single problem family.
///
/// `apply` must return the input unchanged when nothing in `issues` is
/// actionable — the orchestrator uses textual equality to detect a stall.
pub trait FixStrategy: Send + Sync {
    /// Stable name, used in logs and repair history.
    fn name(&self) -> &'static str;

    /// Selection order; lower runs first.
    fn priority(&self) -> u8;

    /// Whether this strategy can act on any of the given issues.
    fn supports(&self, issues: &[Issue]) -> bool;

    /// Apply the repair. Pure: no I/O, deterministic for a given input.
    fn apply(&self, code: &str, issues: &[Issue]) -> String;
}

/// The built-in strategy set, one per issue category.
pub fn builtin_strategies() -> Vec<Box<dyn FixStrategy>> {
    vec![
        Box::new(SyntaxRepair),
        Box::new(StructureRepair),
        Box::new(LogicRepair),
    ]
}

/// Pick the strategies that support `issues`, ordered by priority.
pub fn select_strategies<'a>(
    strategies: &'a [Box<dyn FixStrategy>],
    issues: &[Issue],
) -> Vec<&'a dyn FixStrategy> {
    let mut selected: Vec<&dyn FixStrategy> = strategies
        .iter()
        .filter(|s| s.supports(issues))
        .map(|s| s.as_ref())
        .collect();
    selected.sort_by_key(|s| s.priority());
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify;

    #[test]
    fn test_selection_orders_by_priority() {
        let strategies = builtin_strategies();
        let issues = vec![
            classify("logic warning: no repository or service reference found"),
            classify("syntax error: unbalanced delimiters"),
            classify("structure error: missing class definition"),
        ];
        let selected = select_strategies(&strategies, &issues);
        let names: Vec<_> = selected.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["syntax-repair", "structure-repair", "logic-repair"]);
    }

    #[test]
    fn test_no_strategy_selected_for_unsupported_issues() {
        let strategies = builtin_strategies();
        // A syntax warning alone does not activate the syntax strategy.
        let issues = vec![classify("syntax warning: possible missing semicolons")];
        assert!(select_strategies(&strategies, &issues).is_empty());
    }
}
