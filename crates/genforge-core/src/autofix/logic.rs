//! Priority-3 repair: business logic completeness.

use tracing::debug;

use crate::domain::issue::messages;
use crate::domain::Issue;
use crate::lang;

use super::FixStrategy;

/// Injects a repository field, completes methods that never return, and
/// wraps unprotected method bodies in exception handling.
///
/// Minimally invasive: each fixer checks for the thing it would add and
/// returns the input unchanged when it is already present.
pub struct LogicRepair;

impl FixStrategy for LogicRepair {
    fn name(&self) -> &'static str {
        "logic-repair"
    }

    fn priority(&self) -> u8 {
        3
    }

    fn supports(&self, issues: &[Issue]) -> bool {
        issues.iter().any(|i| i.is_logic())
    }

    fn apply(&self, code: &str, issues: &[Issue]) -> String {
        let mut fixed = code.to_string();

        for issue in issues.iter().filter(|i| i.is_logic()) {
            if issue.message.contains(messages::NO_DEPENDENCY_REFERENCE) {
                fixed = inject_repository_field(&fixed);
            }
            if issue.message.contains(messages::NO_BUSINESS_LOGIC) {
                fixed = complete_business_logic(&fixed);
            }
            if issue.message.contains(messages::MISSING_EXCEPTION_HANDLING) {
                fixed = wrap_in_exception_handling(&fixed);
            }
        }

        fixed
    }
}

/// Add a `private final XxxRepository xxxRepository;` field at the top of
/// the class body, deriving the repository name from the class name.
fn inject_repository_field(code: &str) -> String {
    if code.contains("Repository") && code.contains("private") {
        return code.to_string();
    }

    let Some(class_def_start) = code.find("public class ").or_else(|| code.find("class ")) else {
        return code.to_string();
    };
    let Some(class_body_start) = code[class_def_start..].find('{').map(|i| class_def_start + i)
    else {
        return code.to_string();
    };

    let class_name = extract_class_name(&code[class_def_start..class_body_start]);
    let repository_type = if class_name.ends_with("Service") {
        format!("{}Repository", class_name.trim_end_matches("Service"))
    } else {
        format!("{}Repository", class_name)
    };
    let field_name = lower_first(&repository_type);
    debug!(repository = %repository_type, "injecting repository field");

    format!(
        "{}\n\n    private final {} {};\n{}",
        &code[..=class_body_start],
        repository_type,
        field_name,
        &code[class_body_start + 1..]
    )
}

/// Give the first method body a terminal `return` when it has neither a
/// return nor a throw.
fn complete_business_logic(code: &str) -> String {
    let Some((body_start, body_end)) = first_method_body(code) else {
        return code.to_string();
    };

    let body = &code[body_start + 1..body_end];
    if body.contains("return ") || body.contains("throw ") {
        return code.to_string();
    }
    debug!("completing method body with a default return");

    format!(
        "{}\n        return null;\n    {}",
        &code[..body_end],
        &code[body_end..]
    )
}

/// Wrap the first method body in try/catch with a rethrow.
fn wrap_in_exception_handling(code: &str) -> String {
    if code.contains("try {") || code.contains("catch (") {
        return code.to_string();
    }

    let Some((body_start, body_end)) = first_method_body(code) else {
        return code.to_string();
    };

    let body = &code[body_start + 1..body_end];
    debug!("wrapping method body in exception handling");

    format!(
        "{}\n        try {{\n{}\n        }} catch (Exception e) {{\n            throw new RuntimeException(\"business logic failed: \" + e.getMessage(), e);\n        }}\n    {}",
        &code[..=body_start],
        indent(body.trim_matches('\n'), 1),
        &code[body_end..]
    )
}

/// Locate the first method body: the brace pair following the first
/// `public`/`private` member that is not the class header itself.
fn first_method_body(code: &str) -> Option<(usize, usize)> {
    let method_start = code
        .match_indices("public ")
        .chain(code.match_indices("private "))
        .map(|(i, _)| i)
        .filter(|&i| !code[i..].trim_start().starts_with("public class"))
        .min()?;

    let body_start = code[method_start..].find('{').map(|i| method_start + i)?;
    let body_end = lang::find_matching_brace(code, body_start)?;
    Some((body_start, body_end))
}

fn extract_class_name(header: &str) -> String {
    let after_kw = header.split("class ").nth(1).unwrap_or("");
    after_kw
        .split_whitespace()
        .next()
        .unwrap_or("Generated")
        .to_string()
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn indent(code: &str, level: usize) -> String {
    let pad = "    ".repeat(level);
    code.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
