//! Tier B: cross-artifact consistency.
//!
//! Checks that the generation round produced the full artifact set: an
//! entity layer, a service layer, a controller layer and the schema
//! script, each with real content. Purely structural; unit quality is
//! Tier A's concern.

use genforge_core::domain::artifact::{ArtifactKind, GenerationOutput};
use tracing::info;

use crate::verdict::TierVerdict;

pub const TIER_B_NAME: &str = "artifact-consistency";

/// Penalty per missing or empty artifact category.
pub const MISSING_CATEGORY_PENALTY: u8 = 15;

/// Run the consistency checks over one generation output.
pub fn run(output: &GenerationOutput) -> TierVerdict {
    let mut issues = Vec::new();

    for kind in [
        ArtifactKind::Entity,
        ArtifactKind::Service,
        ArtifactKind::Controller,
    ] {
        if !output.of_kind(kind).any(|a| !a.is_empty()) {
            issues.push(format!("no non-empty {} artifact generated", kind.as_str()));
        }
    }

    match output.schema() {
        Some(schema) if !schema.is_empty() => {}
        Some(_) => issues.push("schema script is empty".to_string()),
        None => issues.push("no schema script generated".to_string()),
    }

    let score = 100u8.saturating_sub(MISSING_CATEGORY_PENALTY * issues.len() as u8);
    info!(
        missing = issues.len(),
        score,
        "artifact consistency tier finished"
    );

    if issues.is_empty() {
        TierVerdict::pass(TIER_B_NAME, score)
    } else {
        TierVerdict::fail(TIER_B_NAME, score, issues)
    }
}
