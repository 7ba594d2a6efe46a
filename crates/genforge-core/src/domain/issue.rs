//! Issue taxonomy and diagnostic classification.
//!
//! The single-artifact scorer emits plain diagnostic strings prefixed by a
//! fixed marker vocabulary; [`classify`] parses those strings back into
//! typed [`Issue`] values. Both sides live in this crate so the vocabulary
//! cannot drift: any new marker must be added to [`MARKER_TABLE`] and is then
//! automatically understood by the classifier.
//!
//! Classification is total. An unrecognized prefix degrades to
//! `{Logic, Warning}` with the whole line as message — it never fails.

use serde::{Deserialize, Serialize};

/// Problem category, mirroring the three scoring levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Syntax,
    Structure,
    Logic,
}

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Blocking problem that must be repaired.
    Error,
    /// Quality problem that does not block.
    Warning,
    /// Improvement suggestion.
    Info,
}

/// A structured validation issue, parsed from one scorer diagnostic line.
///
/// Produced per repair attempt; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: IssueSeverity,
    /// Diagnostic text with the marker prefix stripped.
    pub message: String,
    /// The full raw diagnostic line as received.
    pub original_text: String,
    /// Optional location hint for precise repairs.
    pub location_hint: Option<String>,
}

/// Marker prefixes shared between the scorer and the classifier.
pub mod markers {
    pub const SYNTAX_ERROR: &str = "syntax error: ";
    pub const SYNTAX_WARNING: &str = "syntax warning: ";
    pub const STRUCTURE_ERROR: &str = "structure error: ";
    pub const STRUCTURE_WARNING: &str = "structure warning: ";
    pub const LOGIC_ERROR: &str = "logic error: ";
    pub const LOGIC_WARNING: &str = "logic warning: ";
    pub const LOGIC_HINT: &str = "logic hint: ";
}

/// Diagnostic message catalogue shared between the scorer and the repair
/// strategies. Strategies dispatch on these fragments, so they must match
/// what the scorer emits verbatim.
pub mod messages {
    pub const UNBALANCED_DELIMITERS: &str = "unbalanced delimiters";
    pub const MISSING_SEMICOLONS: &str = "possible missing semicolons";
    pub const MISSPELLED_KEYWORDS: &str = "misspelled keywords detected";

    pub const MISSING_CLASS: &str = "missing class definition";
    pub const MISSING_METHOD: &str = "no method definition found";
    pub const MISSING_PACKAGE: &str = "missing package declaration";

    pub const NO_DEPENDENCY_REFERENCE: &str = "no repository or service reference found";
    pub const DEPENDENCY_WITHOUT_FLOW: &str = "dependency reference present but no control flow";
    pub const EMPTY_METHOD_BODY: &str = "empty method body (comments or TODO only)";
    pub const NO_BUSINESS_LOGIC: &str =
        "no basic business logic found (conditionals, loops, return)";
    pub const MISSING_FIELD_DECLARATION: &str = "missing field declaration for injected dependency";
    pub const INCOMPLETE_EXCEPTION_CONTEXT: &str =
        "exception handling present but business logic incomplete";
    pub const MISSING_EXCEPTION_HANDLING: &str = "missing exception handling";
}

/// Static marker lookup: prefix → (category, severity).
pub const MARKER_TABLE: [(&str, IssueCategory, IssueSeverity); 7] = [
    (markers::SYNTAX_ERROR, IssueCategory::Syntax, IssueSeverity::Error),
    (markers::SYNTAX_WARNING, IssueCategory::Syntax, IssueSeverity::Warning),
    (markers::STRUCTURE_ERROR, IssueCategory::Structure, IssueSeverity::Error),
    (markers::STRUCTURE_WARNING, IssueCategory::Structure, IssueSeverity::Warning),
    (markers::LOGIC_ERROR, IssueCategory::Logic, IssueSeverity::Error),
    (markers::LOGIC_WARNING, IssueCategory::Logic, IssueSeverity::Warning),
    (markers::LOGIC_HINT, IssueCategory::Logic, IssueSeverity::Info),
];

impl Issue {
    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }

    pub fn is_syntax(&self) -> bool {
        self.category == IssueCategory::Syntax
    }

    pub fn is_structure(&self) -> bool {
        self.category == IssueCategory::Structure
    }

    pub fn is_logic(&self) -> bool {
        self.category == IssueCategory::Logic
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:?}/{:?}] {}",
            self.category, self.severity, self.message
        )
    }
}

/// Classify one raw diagnostic line into a typed [`Issue`].
///
/// Total: lines without a known marker become `{Logic, Warning}` carrying
/// the whole line as message.
pub fn classify(raw: &str) -> Issue {
    for (prefix, category, severity) in MARKER_TABLE {
        if let Some(rest) = raw.strip_prefix(prefix) {
            return Issue {
                category,
                severity,
                message: rest.to_string(),
                original_text: raw.to_string(),
                location_hint: None,
            };
        }
    }

    Issue {
        category: IssueCategory::Logic,
        severity: IssueSeverity::Warning,
        message: raw.to_string(),
        original_text: raw.to_string(),
        location_hint: None,
    }
}

/// Classify a batch of raw diagnostics, preserving order.
pub fn classify_all<S: AsRef<str>>(raws: &[S]) -> Vec<Issue> {
    raws.iter().map(|raw| classify(raw.as_ref())).collect()
}
