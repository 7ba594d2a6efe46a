//! Domain model shared across the GenForge engine.

pub mod artifact;
pub mod error;
pub mod issue;

pub use artifact::{Artifact, ArtifactKind, GenerationOutput};
pub use error::{CoreError, Result};
pub use issue::{classify, classify_all, Issue, IssueCategory, IssueSeverity};
