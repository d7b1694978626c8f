//! Heuristic matching of test code against declared entities.
//!
//! Matching is name-based: ordered pattern tables are rendered per entity
//! name and searched case-insensitively against the whole test text,
//! independent of entity line numbers. The result is approximate by design
//! and each rule is testable on its own.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::extractor::SourceInventory;

/// Coverage evidence inferred from test source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestEvidence {
    /// Names considered tested: top-level functions plus qualified methods.
    pub tested_functions: BTreeSet<String>,
    /// Class names considered tested.
    pub tested_classes: BTreeSet<String>,
    /// Approximate line numbers of the test text exercised by test functions.
    pub tested_lines: BTreeSet<usize>,
    /// Matched-pattern count per function or method name.
    pub test_counts: BTreeMap<String, u32>,
    /// Count of identifiers that look like test functions or test classes.
    pub total_test_functions: u32,
}

/// Patterns that mark a function as tested; each match contributes one count.
fn function_patterns(name: &str) -> [String; 4] {
    let name = regex::escape(name);
    [
        format!(r"(?i)\b{name}\s*\("),
        format!(r"(?i)\.{name}\s*\("),
        format!(r"(?i)def test_.*{name}"),
        format!(r"(?i)def test_{name}"),
    ]
}

/// Patterns that mark a class as tested.
fn class_patterns(name: &str) -> [String; 3] {
    let name = regex::escape(name);
    [
        format!(r"(?i)\b{name}\s*\("),
        format!(r"(?i)class Test{name}"),
        format!(r"(?i)class {name}Test"),
    ]
}

/// Patterns that mark a method as tested, rendered from its short name.
fn method_patterns(short_name: &str) -> [String; 2] {
    let short_name = regex::escape(short_name);
    [
        format!(r"(?i)\.{short_name}\s*\("),
        format!(r"(?i)def test_.*{short_name}"),
    ]
}

fn test_definition() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)def test_\w+").unwrap())
}

fn test_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Case-sensitive on purpose: `test_` functions and `Test` classes both
    // count, which can overcount relative to real test collectors.
    RE.get_or_init(|| Regex::new(r"\b(?:test_|Test)\w*").unwrap())
}

/// Lines attributed to one test-function definition beyond its own line.
const TESTED_LINE_WINDOW: usize = 20;

/// Derive [`TestEvidence`] for the given inventory from test source text.
pub fn match_test_code(test_code: &str, inventory: &SourceInventory) -> TestEvidence {
    let mut evidence = TestEvidence::default();

    for name in inventory.functions.keys() {
        let hits = count_pattern_hits(test_code, &function_patterns(name));
        if hits > 0 {
            evidence.tested_functions.insert(name.clone());
            *evidence.test_counts.entry(name.clone()).or_insert(0) += hits;
        }
    }

    for name in inventory.classes.keys() {
        if count_pattern_hits(test_code, &class_patterns(name)) > 0 {
            evidence.tested_classes.insert(name.clone());
        }
    }

    for qualified in inventory.methods.keys() {
        let short_name = qualified.rsplit('.').next().unwrap_or(qualified);
        if evidence.tested_functions.contains(short_name) {
            continue;
        }
        let hits = count_pattern_hits(test_code, &method_patterns(short_name));
        if hits > 0 {
            evidence.tested_functions.insert(qualified.clone());
            *evidence.test_counts.entry(qualified.clone()).or_insert(0) += hits;
        }
    }

    evidence.tested_lines = approximate_tested_lines(test_code);
    evidence.total_test_functions = test_identifier().find_iter(test_code).count() as u32;

    evidence
}

fn count_pattern_hits(text: &str, patterns: &[String]) -> u32 {
    patterns
        .iter()
        .filter(|pattern| {
            Regex::new(pattern)
                .map(|re| re.is_match(text))
                .unwrap_or(false)
        })
        .count() as u32
}

/// For each test-function definition, claim its line plus the following
/// window of lines, bounded by the test text's own line count. A coarse proxy
/// for "lines exercised by this test".
fn approximate_tested_lines(test_code: &str) -> BTreeSet<usize> {
    let total_lines = test_code.split('\n').count();
    let mut lines = BTreeSet::new();
    for found in test_definition().find_iter(test_code) {
        let start_line = test_code[..found.start()].matches('\n').count() + 1;
        let end_line = (start_line + TESTED_LINE_WINDOW).min(total_lines);
        for line in start_line..=end_line {
            lines.insert(line);
        }
    }
    lines
}
