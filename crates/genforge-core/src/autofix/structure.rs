//! Priority-2 repair: missing structural elements.

use tracing::debug;

use crate::domain::issue::messages;
use crate::domain::Issue;
use crate::lang;

use super::FixStrategy;

/// Package prepended when a unit has no declaration of its own.
pub const DEFAULT_PACKAGE: &str = "com.genforge.generated.service";

/// Template class name used when a bare snippet has to be wrapped.
const WRAPPER_CLASS: &str = "GeneratedService";

/// Adds missing package declarations, wraps bare snippets in a service
/// class, and inserts a method skeleton when none exists.
///
/// Template-based and additive only: existing code is indented and kept,
/// never removed.
pub struct StructureRepair;

impl FixStrategy for StructureRepair {
    fn name(&self) -> &'static str {
        "structure-repair"
    }

    fn priority(&self) -> u8 {
        2
    }

    fn supports(&self, issues: &[Issue]) -> bool {
        // Warnings count: a missing package declaration is non-blocking
        // but still repairable.
        issues.iter().any(|i| i.is_structure())
    }

    fn apply(&self, code: &str, issues: &[Issue]) -> String {
        let mut fixed = code.to_string();

        for issue in issues.iter().filter(|i| i.is_structure()) {
            if issue.message.contains(messages::MISSING_PACKAGE) {
                fixed = add_package_declaration(&fixed);
            }
            if issue.message.contains(messages::MISSING_CLASS) {
                fixed = wrap_in_service_class(&fixed);
            }
            if issue.message.contains(messages::MISSING_METHOD) {
                fixed = add_method_skeleton(&fixed);
            }
        }

        fixed
    }
}

fn add_package_declaration(code: &str) -> String {
    if code.trim_start().starts_with("package ") {
        return code.to_string();
    }
    debug!(package = DEFAULT_PACKAGE, "adding package declaration");
    format!("package {};\n\n{}", DEFAULT_PACKAGE, code)
}

/// Wrap a bare snippet in a service class, keeping any existing package
/// declaration above the class.
fn wrap_in_service_class(code: &str) -> String {
    if code.contains("class ") || code.contains("interface ") || code.contains("enum ") {
        return code.to_string();
    }

    let (package_decl, body) = split_package_declaration(code);
    debug!(class = WRAPPER_CLASS, "wrapping snippet in service class");

    format!(
        "{}public class {} {{\n\n{}\n}}\n",
        package_decl,
        WRAPPER_CLASS,
        indent(body.trim(), 1)
    )
}

/// Insert a standard business method at the top of the class body, moving
/// the existing body inside it behind a try block.
fn add_method_skeleton(code: &str) -> String {
    if lang::has_method_definition(code) {
        return code.to_string();
    }

    if !code.contains("class ") && !code.contains("interface ") {
        // A snippet without a class gets the class wrap first; the method
        // check re-fires on the next iteration if still needed.
        return wrap_in_service_class(code);
    }

    let Some(class_body_start) = code.find('{') else {
        return code.to_string();
    };

    let before = &code[..=class_body_start];
    let after = &code[class_body_start + 1..];
    debug!("inserting business method skeleton");

    // The class closer is stripped from the moved body and re-added after
    // the method, keeping delimiters balanced.
    format!(
        "{}\n\n    public void executeBusinessLogic() {{\n        try {{\n{}\n        }} catch (Exception e) {{\n            throw new RuntimeException(\"business logic failed: \" + e.getMessage(), e);\n        }}\n    }}\n}}\n",
        before,
        indent(after.trim_end().trim_end_matches('}').trim_end(), 3)
    )
}

fn split_package_declaration(code: &str) -> (String, &str) {
    if code.trim_start().starts_with("package ") {
        if let Some(end) = code.find(';') {
            return (format!("{}\n\n", code[..=end].trim()), code[end + 1..].trim_start());
        }
    }
    (String::new(), code)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify;
    use crate::scorer::{ArtifactScorer, HeuristicScorer};

    #[test]
    fn test_adds_default_package() {
        let issue = classify("structure warning: missing package declaration");
        let fixed = StructureRepair.apply("public class A { }", &[issue]);
        assert!(fixed.starts_with("package com.genforge.generated.service;"));
        assert!(fixed.contains("public class A { }"));
    }

    #[test]
    fn test_existing_package_left_alone() {
        let issue = classify("structure warning: missing package declaration");
        let code = "package com.acme;\n\nclass A { }";
        assert_eq!(StructureRepair.apply(code, &[issue]), code);
    }

    #[test]
    fn test_wraps_bare_snippet_in_class() {
        let issue = classify("structure error: missing class definition");
        let fixed = StructureRepair.apply("int count = orderRepository.count();", &[issue]);
        assert!(fixed.contains("public class GeneratedService {"));
        assert!(fixed.contains("int count = orderRepository.count();"));
        assert!(lang::count_delimiters(&fixed).is_balanced());
    }

    #[test]
    fn test_wrap_preserves_package_declaration() {
        let issue = classify("structure error: missing class definition");
        let code = "package com.acme;\nint x = 1;";
        let fixed = StructureRepair.apply(code, &[issue]);
        assert!(fixed.starts_with("package com.acme;"));
        let package_pos = fixed.find("package").unwrap();
        let class_pos = fixed.find("public class").unwrap();
        assert!(package_pos < class_pos);
    }

    #[test]
    fn test_adds_method_skeleton_inside_class() {
        let issue = classify("structure warning: no method definition found");
        let code = "public class OrderService {\n    int x = 1;\n}";
        let fixed = StructureRepair.apply(code, &[issue]);
        assert!(fixed.contains("public void executeBusinessLogic()"));
        assert!(fixed.contains("catch (Exception e)"));
        assert!(lang::count_delimiters(&fixed).is_balanced());
    }

    #[test]
    fn test_repaired_snippet_scores_higher() {
        let scorer = HeuristicScorer::new();
        let snippet = "int count = orderRepository.count();";
        let before = scorer.score(snippet, "Snippet.java").unwrap();

        let issues = vec![
            classify("structure error: missing class definition"),
            classify("structure warning: missing package declaration"),
        ];
        let fixed = StructureRepair.apply(snippet, &issues);
        let after = scorer.score(&fixed, "Snippet.java").unwrap();
        assert!(after.quality_score > before.quality_score);
    }
}
