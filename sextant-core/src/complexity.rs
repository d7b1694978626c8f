//! Cyclomatic-style complexity estimates over line ranges.
//!
//! These are token-frequency proxies, not control-flow-graph metrics: each
//! occurrence of a branching or boolean keyword inside the range counts once,
//! no matter how the statements nest.

use std::sync::OnceLock;

use regex::Regex;

use crate::extractor::LineSpan;

/// Word-boundary matched, case-sensitive keyword set counted by both metrics.
pub(crate) fn branch_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:if|elif|else|for|while|try|except|finally|with|assert|and|or|not)\b")
            .unwrap()
    })
}

fn method_declaration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:async\s+)?def\s+\w+\s*\(").unwrap())
}

/// Complexity of a function body: base 1 plus one per keyword occurrence.
///
/// Multiple occurrences on one line all count.
pub fn function_complexity(source: &str, span: LineSpan) -> u32 {
    1 + keyword_occurrences(source, span)
}

/// Complexity of a class body: its method-declaration count plus the keyword
/// sum over the same range. The method count is added, not multiplied.
pub fn class_complexity(source: &str, span: LineSpan) -> u32 {
    let methods = range_lines(source, span)
        .filter(|line| method_declaration().is_match(line))
        .count() as u32;
    methods + keyword_occurrences(source, span)
}

fn keyword_occurrences(source: &str, span: LineSpan) -> u32 {
    range_lines(source, span)
        .map(|line| branch_keywords().find_iter(line).count() as u32)
        .sum()
}

fn range_lines(source: &str, span: LineSpan) -> impl Iterator<Item = &str> {
    source
        .split('\n')
        .enumerate()
        .filter(move |(index, _)| index + 1 >= span.start && index + 1 <= span.end)
        .map(|(_, line)| line)
}
