//! Generated artifact model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a generated artifact unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Entity,
    Service,
    Controller,
    /// Database schema / migration script.
    Schema,
    Other,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Entity => "entity",
            ArtifactKind::Service => "service",
            ArtifactKind::Controller => "controller",
            ArtifactKind::Schema => "schema",
            ArtifactKind::Other => "other",
        }
    }
}

/// One named unit of generated source content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: Uuid,
    pub name: String,
    pub kind: ArtifactKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, kind: ArtifactKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this unit carries any non-whitespace content.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Output of one generation request: the full artifact set for a round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub artifacts: Vec<Artifact>,
}

impl GenerationOutput {
    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(move |a| a.kind == kind)
    }

    /// The schema script, if one was generated.
    pub fn schema(&self) -> Option<&Artifact> {
        self.of_kind(ArtifactKind::Schema).next()
    }
}
