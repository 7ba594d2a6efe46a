//! Cross-round failure memory.
//!
//! Remembers the error signature of each failed round so the
//! orchestrator can tell a stuck job (identical signature, no progress)
//! from one that is still moving (signature changed). The former stops
//! early; the latter may earn a round-budget extension near the limit.

use genforge_core::error_signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundObservation {
    /// First failure this job has seen.
    FirstFailure,
    /// Same signature as the previous round: no progress.
    Repeated,
    /// Different signature from the previous round.
    Changed,
}

#[derive(Debug, Default)]
pub struct RoundMemory {
    signatures: Vec<String>,
}

impl RoundMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the signature of a failed round and classify it against
    /// the previous one.
    pub fn observe(&mut self, issues: &[String]) -> (String, RoundObservation) {
        let signature = error_signature::compute(issues);
        let observation = match self.signatures.last() {
            None => RoundObservation::FirstFailure,
            Some(previous) if error_signature::is_same_error(previous, &signature) => {
                RoundObservation::Repeated
            }
            Some(_) => RoundObservation::Changed,
        };
        self.signatures.push(signature.clone());
        (signature, observation)
    }

    pub fn failed_rounds(&self) -> usize {
        self.signatures.len()
    }
}
