//! Branch coverage over one-line trigger patterns.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{BranchPercentages, round_percentage};

/// Branch-type labels and the line pattern that triggers each.
///
/// The trailing `:` requirement keeps identifier hits (`iffy`, `forty`) and
/// expression-form conditionals out of the totals.
const BRANCH_RULES: &[(&str, &str)] = &[
    ("if_statement", r"\bif\b.*:"),
    ("for_loop", r"\bfor\b.*:"),
    ("while_loop", r"\bwhile\b.*:"),
    ("try_block", r"\btry\b\s*:"),
    ("except_block", r"\bexcept\b.*:"),
    ("else_block", r"\belse\b\s*:"),
];

fn branch_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        BRANCH_RULES
            .iter()
            .map(|(label, pattern)| (*label, Regex::new(pattern).unwrap()))
            .collect()
    })
}

/// Compute per-label branch coverage percentages.
///
/// Every source line matching a label's pattern increments that label's
/// total; lines also present in `executed_lines` increment its covered count.
/// Labels with no textual occurrence are omitted entirely rather than
/// reported as 100%.
pub fn branch_coverage(source: &str, executed_lines: &BTreeSet<usize>) -> BranchPercentages {
    let mut result = BranchPercentages::new();
    for (label, pattern) in branch_patterns() {
        let mut total = 0usize;
        let mut covered = 0usize;
        for (index, line) in source.split('\n').enumerate() {
            if !pattern.is_match(line) {
                continue;
            }
            total += 1;
            if executed_lines.contains(&(index + 1)) {
                covered += 1;
            }
        }
        if total == 0 {
            continue;
        }
        let percentage = round_percentage(covered as f64 / total as f64 * 100.0);
        result.insert((*label).to_string(), percentage);
    }
    result
}
