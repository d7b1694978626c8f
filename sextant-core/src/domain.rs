//! Domain entities for Sextant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A mapping of branch-type labels to coverage percentages.
pub type BranchPercentages = BTreeMap<String, f64>;

/// Kind of reporting unit in a coverage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A top-level function.
    Function,
    /// A class declaration.
    Class,
    /// A method, qualified as `Class.method`.
    Method,
    /// A synthesized branch bucket.
    Branch,
    /// A single line bucket.
    Line,
}

/// A (line, covered) pair tracked for a branch-introducing construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BranchMark {
    /// 1-indexed source line of the branch.
    pub line: usize,
    /// Whether the line appears in the executed-line evidence.
    pub covered: bool,
}

/// One reporting unit derived from a declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoverageItem {
    /// Entity name; methods are qualified as `Class.method`.
    pub name: String,
    /// Kind of entity this item reports on.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// First line of the declaration, 1-indexed inclusive.
    pub line_start: usize,
    /// Last line of the declaration, 1-indexed inclusive.
    pub line_end: usize,
    /// Whether any coverage evidence reaches this entity.
    pub is_covered: bool,
    /// Cyclomatic-style complexity of the entity's line range.
    pub complexity: u32,
    /// Number of test patterns that matched this entity.
    pub test_count: u32,
    /// Per-branch coverage marks. Reserved, may be empty.
    pub branches: Vec<BranchMark>,
}

/// The full result of one coverage analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoverageReport {
    /// Number of top-level functions declared.
    pub total_functions: usize,
    /// Number of covered top-level functions.
    pub covered_functions: usize,
    /// Number of classes declared.
    pub total_classes: usize,
    /// Number of covered classes.
    pub covered_classes: usize,
    /// Number of methods declared.
    pub total_methods: usize,
    /// Number of covered methods.
    pub covered_methods: usize,
    /// Number of lines the source splits into (an empty source is one line).
    pub total_lines: usize,
    /// Size of the executed-line evidence set.
    pub covered_lines: usize,
    /// Overall coverage percentage across all entity kinds and lines.
    pub coverage_percentage: f64,
    /// Items with no coverage evidence, in discovery order.
    pub uncovered_items: Vec<CoverageItem>,
    /// Items with complexity above 10, in discovery order.
    pub high_complexity_items: Vec<CoverageItem>,
    /// Covered-flag per top-level function name.
    pub function_coverage: BTreeMap<String, bool>,
    /// Covered-flag per qualified method name.
    pub method_coverage: BTreeMap<String, bool>,
    /// Percentage per branch-type label; labels absent from the source are omitted.
    pub branch_coverage: BranchPercentages,
    /// Prioritized remediation suggestions.
    pub suggestions: Vec<String>,
}

/// Coverage percentages of the public summary view, 2-decimal rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummaryPercentages {
    /// Overall coverage across functions, classes, methods and lines.
    pub overall_coverage: f64,
    /// Covered functions over total functions.
    pub function_coverage: f64,
    /// Covered classes over total classes.
    pub class_coverage: f64,
    /// Covered methods over total methods.
    pub method_coverage: f64,
    /// Covered lines over total lines.
    pub line_coverage: f64,
}

/// Raw counts of the public summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryMetrics {
    /// Number of top-level functions declared.
    pub total_functions: usize,
    /// Number of covered top-level functions.
    pub covered_functions: usize,
    /// Number of classes declared.
    pub total_classes: usize,
    /// Number of covered classes.
    pub covered_classes: usize,
    /// Number of methods declared.
    pub total_methods: usize,
    /// Number of covered methods.
    pub covered_methods: usize,
    /// Number of lines the source splits into.
    pub total_lines: usize,
    /// Size of the executed-line evidence set.
    pub covered_lines: usize,
}

/// Public summary view of a [`CoverageReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoverageSummary {
    /// Percentage block.
    pub summary: SummaryPercentages,
    /// Count block.
    pub metrics: SummaryMetrics,
    /// Percentage per branch-type label.
    pub branch_coverage: BranchPercentages,
    /// Number of uncovered items.
    pub uncovered_count: usize,
    /// Number of high-complexity items.
    pub high_complexity_count: usize,
    /// Prioritized remediation suggestions.
    pub suggestions: Vec<String>,
}

/// Severity of a review issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Likely defect.
    Error,
    /// Smell worth fixing.
    Warning,
    /// Style note.
    Info,
}

/// A single issue raised by the line reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewIssue {
    /// Issue severity.
    pub severity: Severity,
    /// 1-indexed line the issue was found on.
    pub line: usize,
    /// Human-readable description of the issue.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Result of a heuristic code review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewResult {
    /// Review score, 0-100.
    pub score: u8,
    /// Issues found, in line order.
    pub issues: Vec<ReviewIssue>,
    /// Distinct remediation suggestions, in first-seen order.
    pub suggestions: Vec<String>,
    /// Control-flow keyword density, 0.0-1.0.
    pub complexity_score: f64,
}

/// Round a percentage to two decimal places.
pub(crate) fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_item_serializes_kind_as_type() {
        let item = CoverageItem {
            name: "orbit".to_string(),
            kind: ItemKind::Function,
            line_start: 1,
            line_end: 4,
            is_covered: false,
            complexity: 2,
            test_count: 0,
            branches: Vec::new(),
        };
        let json = serde_json::to_value(&item).expect("serialize item");
        assert_eq!(json["type"], "function");
        assert_eq!(json["line_start"], 1);
    }

    #[test]
    fn review_issue_omits_missing_suggestion() {
        let issue = ReviewIssue {
            severity: Severity::Info,
            line: 3,
            message: "trailing whitespace".to_string(),
            suggestion: None,
        };
        let json = serde_json::to_value(&issue).expect("serialize issue");
        assert!(json.get("suggestion").is_none());
        assert_eq!(json["severity"], "info");
    }

    #[test]
    fn rounds_percentages_to_two_decimals() {
        assert_eq!(round_percentage(66.66666), 66.67);
        assert_eq!(round_percentage(0.0), 0.0);
        assert_eq!(round_percentage(100.0), 100.0);
    }
}
