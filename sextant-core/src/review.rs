//! Heuristic line-by-line code review.
//!
//! The reviewer walks source lines against a fixed rule table and turns the
//! hits into a score. It deliberately knows nothing about syntax beyond what
//! a regex can see; the goal is fast smell detection, not linting.

use std::sync::OnceLock;

use regex::Regex;

use crate::complexity::branch_keywords;
use crate::domain::{ReviewIssue, ReviewResult, Severity};

/// Maximum line length before a readability warning fires.
const MAX_LINE_LENGTH: usize = 120;

struct ReviewRule {
    severity: Severity,
    /// Languages the rule applies to; `None` means every language.
    languages: Option<&'static [&'static str]>,
    pattern: &'static str,
    message: &'static str,
    suggestion: Option<&'static str>,
}

const REVIEW_RULES: &[ReviewRule] = &[
    ReviewRule {
        severity: Severity::Info,
        languages: None,
        pattern: r"[ \t]+$",
        message: "Trailing whitespace.",
        suggestion: Some("Remove trailing whitespace."),
    },
    ReviewRule {
        severity: Severity::Info,
        languages: None,
        pattern: r"\b(?:TODO|FIXME|XXX)\b",
        message: "Lingering TODO marker.",
        suggestion: Some("Resolve the marker or file an issue for it."),
    },
    ReviewRule {
        severity: Severity::Info,
        languages: None,
        pattern: r"^(?: {16,}|\t{4,})",
        message: "Deeply nested code.",
        suggestion: Some("Extract a helper to flatten the nesting."),
    },
    ReviewRule {
        severity: Severity::Warning,
        languages: Some(&["python"]),
        pattern: r"^\s*print\s*\(",
        message: "print call left in code.",
        suggestion: Some("Route output through the logging module."),
    },
    ReviewRule {
        severity: Severity::Warning,
        languages: Some(&["python"]),
        pattern: r"\bexcept\s*:",
        message: "Bare except hides unrelated failures.",
        suggestion: Some("Catch a specific exception type."),
    },
    ReviewRule {
        severity: Severity::Warning,
        languages: Some(&["python"]),
        pattern: r"[!=]=\s*None\b",
        message: "Equality comparison with None.",
        suggestion: Some("Use `is None` or `is not None`."),
    },
    ReviewRule {
        severity: Severity::Error,
        languages: Some(&["python"]),
        pattern: r"def\s+\w+\([^)]*=\s*(?:\[\]|\{\})",
        message: "Mutable default argument.",
        suggestion: Some("Default to None and build the value inside the function."),
    },
    ReviewRule {
        severity: Severity::Warning,
        languages: Some(&["javascript", "typescript"]),
        pattern: r"console\.(?:log|debug)\s*\(",
        message: "Console output left in code.",
        suggestion: Some("Remove the console call or use a logger."),
    },
    ReviewRule {
        severity: Severity::Info,
        languages: Some(&["javascript", "typescript"]),
        pattern: r"\bvar\s+\w+",
        message: "var declaration.",
        suggestion: Some("Prefer const or let."),
    },
    ReviewRule {
        severity: Severity::Warning,
        languages: Some(&["rust"]),
        pattern: r"\.unwrap\(\)",
        message: "unwrap() can panic.",
        suggestion: Some("Propagate the error with `?` or handle the None case."),
    },
];

fn compiled_rules() -> &'static Vec<(&'static ReviewRule, Regex)> {
    static RULES: OnceLock<Vec<(&'static ReviewRule, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        REVIEW_RULES
            .iter()
            .map(|rule| (rule, Regex::new(rule.pattern).unwrap()))
            .collect()
    })
}

fn severity_penalty(severity: Severity) -> i32 {
    match severity {
        Severity::Error => 10,
        Severity::Warning => 5,
        Severity::Info => 1,
    }
}

/// Review `content` written in `language` and score it.
///
/// Deterministic for identical inputs. Empty content scores 100 with no
/// issues.
pub fn review_code(content: &str, language: &str) -> ReviewResult {
    let language = language.to_lowercase();
    let mut issues: Vec<ReviewIssue> = Vec::new();

    for (index, line) in content.split('\n').enumerate() {
        let number = index + 1;
        if line.chars().count() > MAX_LINE_LENGTH {
            issues.push(ReviewIssue {
                severity: Severity::Warning,
                line: number,
                message: format!("Line exceeds {MAX_LINE_LENGTH} characters."),
                suggestion: Some("Break the line up or extract a variable.".to_string()),
            });
        }
        for (rule, pattern) in compiled_rules() {
            let applies = rule
                .languages
                .is_none_or(|languages| languages.contains(&language.as_str()));
            if applies && pattern.is_match(line) {
                issues.push(ReviewIssue {
                    severity: rule.severity,
                    line: number,
                    message: rule.message.to_string(),
                    suggestion: rule.suggestion.map(str::to_string),
                });
            }
        }
    }

    let penalty: i32 = issues
        .iter()
        .map(|issue| severity_penalty(issue.severity))
        .sum();
    let score = (100 - penalty).clamp(0, 100) as u8;

    let mut suggestions: Vec<String> = Vec::new();
    for issue in &issues {
        if let Some(suggestion) = &issue.suggestion {
            if !suggestions.contains(suggestion) {
                suggestions.push(suggestion.clone());
            }
        }
    }

    ReviewResult {
        score,
        issues,
        suggestions,
        complexity_score: complexity_density(content),
    }
}

/// Control-flow keyword density over non-blank lines, clamped to [0, 1].
fn complexity_density(content: &str) -> f64 {
    let non_blank = content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .count();
    if non_blank == 0 {
        return 0.0;
    }
    let hits = branch_keywords().find_iter(content).count();
    (hits as f64 / non_blank as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::review_code;
    use crate::domain::Severity;

    #[test]
    fn empty_content_scores_perfect() {
        let result = review_code("", "python");

        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert_eq!(result.complexity_score, 0.0);
    }

    #[test]
    fn print_call_is_flagged_for_python_only() {
        let content = "print(\"debug\")\n";
        let python = review_code(content, "python");
        assert!(python.issues.iter().any(|i| i.message.contains("print")));

        let javascript = review_code(content, "javascript");
        assert!(!javascript.issues.iter().any(|i| i.message.contains("print")));
    }

    #[test]
    fn mutable_default_argument_is_an_error() {
        let result = review_code("def collect(items=[]):\n    return items\n", "python");

        let issue = result
            .issues
            .iter()
            .find(|i| i.message.contains("Mutable default"))
            .expect("mutable default issue");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.line, 1);
        assert!(result.score <= 90);
    }

    #[test]
    fn unwrap_is_flagged_for_rust() {
        let result = review_code("let value = maybe.unwrap();\n", "rust");

        assert!(result.issues.iter().any(|i| i.message.contains("unwrap")));
    }

    #[test]
    fn long_lines_are_flagged_with_their_number() {
        let content = format!("short = 1\n{}\n", "x = 1  # ".to_string() + &"y".repeat(130));
        let result = review_code(&content, "python");

        let issue = result
            .issues
            .iter()
            .find(|i| i.message.contains("exceeds"))
            .expect("long line issue");
        assert_eq!(issue.line, 2);
    }

    #[test]
    fn suggestions_are_distinct_and_ordered() {
        let content = "x = 1 \ny = 2 \nprint(x)\n";
        let result = review_code(content, "python");

        let trailing = result
            .suggestions
            .iter()
            .filter(|s| s.contains("trailing whitespace"))
            .count();
        assert_eq!(trailing, 1);
        assert!(result.suggestions[0].contains("trailing whitespace"));
    }

    #[test]
    fn score_never_goes_below_zero() {
        let noisy = "def f(a=[]):\n".repeat(30);
        let result = review_code(&noisy, "python");

        assert_eq!(result.score, 0);
    }

    #[test]
    fn complexity_density_rises_with_branching() {
        let straight = review_code("x = 1\ny = 2\n", "python");
        let branchy = review_code("if a and b:\n    pass\n", "python");

        assert!(branchy.complexity_score > straight.complexity_score);
        assert!(branchy.complexity_score <= 1.0);
    }

    #[test]
    fn review_is_deterministic() {
        let content = "print(1)\nx = 1 \n";
        assert_eq!(review_code(content, "python"), review_code(content, "python"));
    }
}
