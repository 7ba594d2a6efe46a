//! Stable signatures for validation failures.
//!
//! Round-to-round repair must not chase the same error forever: two rounds
//! that fail with "the same" diagnostics should produce the same signature
//! even when line numbers, paths or timestamps differ. The signature
//! extracts known error shapes, normalizes the symbols they mention and
//! hashes the sorted result.

use regex::Regex;
use sha2::{Digest, Sha256};

/// Sentinel signature for empty diagnostic input.
pub const EMPTY_OUTPUT: &str = "EMPTY_OUTPUT";

/// Known diagnostic shapes, most specific first. The capture group, when
/// present, names the symbol involved.
const ERROR_PATTERNS: &[(&str, &str)] = &[
    ("SYMBOL_NOT_FOUND", r"(?is)cannot find symbol.*?symbol:\s*(?:class|variable|method)\s+(\w+)"),
    ("INCOMPATIBLE_TYPES", r"(?i)incompatible types:.*?(?:required|found):\s*(\S+)"),
    ("PACKAGE_NOT_EXIST", r"(?i)package\s+(\S+)\s+does not exist"),
    ("METHOD_NOT_APPLICABLE", r"(?i)method\s+(\w+).*?cannot be applied"),
    ("UNREPORTED_EXCEPTION", r"(?i)unreported exception\s+(\S+)"),
    ("MISSING_RETURN", r"(?i)missing return statement"),
    ("SYNTAX_ERROR", r"(?i)(';'|'\)'|'\{'|'\}')\s*expected"),
    ("ILLEGAL_START", r"(?i)illegal start of (expression|type)"),
    ("UNBALANCED_DELIMITERS", r"(?i)unbalanced delimiters"),
    ("MISSPELLED_KEYWORDS", r"(?i)misspelled keywords"),
    ("MISSING_CLASS", r"(?i)missing class definition"),
];

/// Compute a stable signature over a batch of diagnostic lines.
///
/// Lines are matched against [`ERROR_PATTERNS`]; when none match, the
/// normalized raw text is hashed under an `UNKNOWN_` prefix so distinct
/// unrecognized failures still get distinct signatures.
pub fn compute(diagnostics: &[String]) -> String {
    let combined = diagnostics.join("\n");
    if combined.trim().is_empty() {
        return EMPTY_OUTPUT.to_string();
    }

    let mut extracted = extract_errors(&combined);
    if extracted.is_empty() {
        return format!("UNKNOWN_{}", hash_text(&normalize_output(&combined)));
    }

    extracted.sort();
    extracted.dedup();
    hash_text(&extracted.join("|"))
}

/// Whether two signatures denote the same failure.
pub fn is_same_error(a: &str, b: &str) -> bool {
    !a.is_empty() && a == b
}

fn extract_errors(output: &str) -> Vec<String> {
    let mut results = Vec::new();

    for (kind, pattern) in ERROR_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            for caps in re.captures_iter(output) {
                let mut entry = (*kind).to_string();
                if let Some(symbol) = caps.get(1) {
                    entry.push(':');
                    entry.push_str(&normalize_symbol(symbol.as_str()));
                }
                results.push(entry);
            }
        }
    }

    results
}

/// Strip generics and package prefixes from a symbol, lowercase the rest.
fn normalize_symbol(symbol: &str) -> String {
    let mut s = symbol.to_string();
    if let Ok(re) = Regex::new(r"<[^>]+>") {
        s = re.replace_all(&s, "").into_owned();
    }
    if let Some(idx) = s.rfind('.') {
        s = s[idx + 1..].to_string();
    }
    s.trim().to_lowercase()
}

/// Remove the parts of raw output that vary between identical failures:
/// timestamps, line/column numbers, absolute paths.
fn normalize_output(output: &str) -> String {
    let mut s = output.to_string();
    for (pattern, replacement) in [
        (r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}", ""),
        (r":\d+:", ":"),
        (r"\[\d+,\d+\]", ""),
        (r"/[a-zA-Z0-9_/.-]+/([A-Z][a-zA-Z0-9]+\.java)", "$1"),
        (r"\s+", " "),
    ] {
        if let Ok(re) = Regex::new(pattern) {
            s = re.replace_all(&s, replacement).into_owned();
        }
    }

    let s = s.trim();
    // Cap the input to the fallback hash so pathological output stays cheap.
    s.chars().take(500).collect()
}

/// SHA-256 over the text, first 8 bytes as lowercase hex.
fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..8])
}
