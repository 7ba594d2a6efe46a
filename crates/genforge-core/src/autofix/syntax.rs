//! Priority-1 repair: blocking syntax problems.

use regex::Regex;
use tracing::debug;

use crate::domain::issue::messages;
use crate::domain::Issue;
use crate::lang;

use super::FixStrategy;

/// Repairs delimiter imbalance, missing statement terminators and
/// misspelled keywords.
///
/// Activated only when a blocking syntax error is present; once active it
/// also acts on syntax warnings in the same batch, so a semicolon warning
/// riding along with a delimiter error gets repaired in the same pass.
pub struct SyntaxRepair;

impl FixStrategy for SyntaxRepair {
    fn name(&self) -> &'static str {
        "syntax-repair"
    }

    fn priority(&self) -> u8 {
        1
    }

    fn supports(&self, issues: &[Issue]) -> bool {
        issues.iter().any(|i| i.is_syntax() && i.is_error())
    }

    fn apply(&self, code: &str, issues: &[Issue]) -> String {
        let mut fixed = code.to_string();

        for issue in issues.iter().filter(|i| i.is_syntax()) {
            if issue.message.contains(messages::UNBALANCED_DELIMITERS) {
                fixed = balance_delimiters(&fixed);
            }
            if issue.message.contains(messages::MISSING_SEMICOLONS) {
                fixed = terminate_statements(&fixed);
            }
            if issue.message.contains(messages::MISSPELLED_KEYWORDS) {
                fixed = correct_keywords(&fixed);
            }
        }

        fixed
    }
}

/// Append missing closers at the end, prepend missing openers at the
/// start. Uses net counts only; interleaving errors are out of scope for
/// a rule engine.
fn balance_delimiters(code: &str) -> String {
    let balance = lang::count_delimiters(code);
    let mut fixed = code.to_string();

    if balance.braces > 0 {
        for _ in 0..balance.braces {
            fixed.push_str("\n}");
        }
    } else {
        for _ in 0..-balance.braces {
            fixed.insert_str(0, "{\n");
        }
    }

    if balance.brackets > 0 {
        for _ in 0..balance.brackets {
            fixed.push(']');
        }
    } else {
        for _ in 0..-balance.brackets {
            fixed.insert(0, '[');
        }
    }

    if balance.parens > 0 {
        for _ in 0..balance.parens {
            fixed.push(')');
        }
    } else {
        for _ in 0..-balance.parens {
            fixed.insert(0, '(');
        }
    }

    fixed
}

/// Append `;` to statement-looking lines that lack one.
///
/// Declaration lines, comments, annotations and brace lines are left
/// alone. A line counts as a statement when it assigns, calls, returns
/// or throws.
fn terminate_statements(code: &str) -> String {
    let mut fixed = String::with_capacity(code.len());

    for line in code.lines() {
        let trimmed = line.trim();

        let skip = trimmed.is_empty()
            || trimmed.starts_with("//")
            || trimmed.starts_with("/*")
            || trimmed.starts_with('*')
            || trimmed.ends_with(';')
            || trimmed.ends_with('{')
            || trimmed.ends_with('}')
            || trimmed.starts_with("package ")
            || trimmed.starts_with("import ")
            || trimmed.starts_with('@')
            || trimmed.contains("class ")
            || trimmed.contains("interface ")
            || trimmed.contains("enum ")
            || is_declaration_header(trimmed);

        let needs_semicolon = !skip
            && (trimmed.contains('=')
                || trimmed.starts_with("return ")
                || trimmed.starts_with("throw ")
                || trimmed.contains('.')
                || trimmed.ends_with(')'));

        fixed.push_str(line);
        if needs_semicolon {
            debug!(line = %trimmed, "adding statement terminator");
            fixed.push(';');
        }
        fixed.push('\n');
    }

    fixed
}

/// Method signatures end with `)` like calls do; the leading modifier
/// keyword tells them apart.
fn is_declaration_header(trimmed: &str) -> bool {
    ["public ", "private ", "protected ", "static ", "void ", "final "]
        .iter()
        .any(|kw| trimmed.starts_with(kw))
}

/// Replace misspelled keywords using word-boundary matching, so `clas`
/// is corrected without touching `class`.
fn correct_keywords(code: &str) -> String {
    let mut fixed = code.to_string();

    for (wrong, correct) in lang::KEYWORD_FIXES {
        if let Ok(re) = Regex::new(&format!(r"\b{}\b", wrong)) {
            fixed = re.replace_all(&fixed, correct).into_owned();
        }
    }

    fixed
}
