//! Per-tier validation verdicts.

use serde::{Deserialize, Serialize};

/// Outcome of one validation tier. Tiers are independent: each produces
/// its own verdict and shares no mutable state with the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierVerdict {
    pub tier_name: String,
    pub passed: bool,
    /// 0..=100.
    pub score: u8,
    pub issues: Vec<String>,
}

impl TierVerdict {
    pub fn pass(tier_name: impl Into<String>, score: u8) -> Self {
        Self {
            tier_name: tier_name.into(),
            passed: true,
            score,
            issues: Vec::new(),
        }
    }

    pub fn fail(tier_name: impl Into<String>, score: u8, issues: Vec<String>) -> Self {
        Self {
            tier_name: tier_name.into(),
            passed: false,
            score,
            issues,
        }
    }
}
