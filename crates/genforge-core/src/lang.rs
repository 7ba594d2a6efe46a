//! Lightweight source-text heuristics for generated Java-style units.
//!
//! Shared by the heuristic scorer and the fix strategies so both sides agree
//! on what "has a class", "has a method", or "balanced delimiters" means.
//! These are deliberately token-level checks, not a parser: generated
//! snippets are frequently malformed, which is the whole point.

use regex::Regex;

/// Fixed table of common keyword misspellings and their corrections.
///
/// Patterns are matched with word boundaries so that e.g. `clas` never
/// matches inside `class`.
pub const KEYWORD_FIXES: [(&str, &str); 10] = [
    ("pubilc", "public"),
    ("priavte", "private"),
    ("protecetd", "protected"),
    ("staitc", "static"),
    ("fianl", "final"),
    ("retrun", "return"),
    ("throew", "throw"),
    ("clas", "class"),
    ("intrface", "interface"),
    ("impelments", "implements"),
];

/// Open-minus-close counts for the three delimiter pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelimiterBalance {
    pub braces: i32,
    pub brackets: i32,
    pub parens: i32,
    /// A closing delimiter appeared before its opener at some point.
    pub dipped_negative: bool,
}

impl DelimiterBalance {
    pub fn is_balanced(&self) -> bool {
        self.braces == 0 && self.brackets == 0 && self.parens == 0 && !self.dipped_negative
    }
}

/// Count delimiter balance across the whole text.
pub fn count_delimiters(code: &str) -> DelimiterBalance {
    let mut balance = DelimiterBalance::default();
    for c in code.chars() {
        match c {
            '{' => balance.braces += 1,
            '}' => balance.braces -= 1,
            '[' => balance.brackets += 1,
            ']' => balance.brackets -= 1,
            '(' => balance.parens += 1,
            ')' => balance.parens -= 1,
            _ => {}
        }
        if balance.braces < 0 || balance.brackets < 0 || balance.parens < 0 {
            balance.dipped_negative = true;
        }
    }
    balance
}

fn matches_pattern(code: &str, pattern: &str) -> bool {
    // Patterns here are fixed literals; a failed compile degrades to "absent"
    // rather than failing the caller.
    if let Ok(re) = Regex::new(pattern) {
        re.is_match(code)
    } else {
        false
    }
}

/// Whether a type declaration (class / interface / enum) is present.
pub fn has_type_declaration(code: &str) -> bool {
    matches_pattern(
        code,
        r"(public|private|protected)?\s*(class|interface|enum)\s+\w+[^{]*\{",
    )
}

/// Whether a method definition with a body is present.
pub fn has_method_definition(code: &str) -> bool {
    matches_pattern(
        code,
        r"(public|private|protected)\s+[\w<>\[\]]+\s+\w+\s*\([^)]*\)\s*\{",
    )
}

/// Whether a package declaration is present.
pub fn has_package_declaration(code: &str) -> bool {
    matches_pattern(code, r"package\s+[a-z]+(\.[a-z][a-z0-9]*)*\s*;")
}

/// Whether a method body is effectively empty (comments or TODO only).
pub fn has_empty_method_body(code: &str) -> bool {
    matches_pattern(code, r"\{\s*(//[^\n]*\s*)*\}")
}

/// Whether any misspelled keyword from [`KEYWORD_FIXES`] appears as a word.
pub fn has_misspelled_keyword(code: &str) -> bool {
    KEYWORD_FIXES.iter().any(|(wrong, _)| {
        matches_pattern(code, &format!(r"\b{}\b", wrong))
    })
}

/// Find the index of the `}` matching the `{` at `open_idx`.
///
/// Returns `None` when `open_idx` does not point at `{` or the body never
/// closes — callers degrade to a no-op in that case.
pub fn find_matching_brace(code: &str, open_idx: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    if bytes.get(open_idx) != Some(&b'{') {
        return None;
    }

    let mut depth = 0i32;
    for (offset, c) in code[open_idx..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open_idx + offset);
                }
            }
            _ => {}
        }
    }
    None
}
