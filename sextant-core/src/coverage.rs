//! Coverage aggregation across structural, explicit, and test-derived evidence.

use std::collections::{BTreeMap, BTreeSet};

use crate::branches::branch_coverage;
use crate::complexity::{class_complexity, function_complexity};
use crate::domain::{
    CoverageItem, CoverageReport, CoverageSummary, ItemKind, SummaryMetrics, SummaryPercentages,
    round_percentage,
};
use crate::error::Result;
use crate::extractor::{LineSpan, extract_inventory};
use crate::matcher::match_test_code;
use crate::suggest::generate_suggestions;

/// Complexity above which an item lands in the high-complexity list.
const HIGH_COMPLEXITY_THRESHOLD: u32 = 10;

/// Analyze coverage of `source_code` against the supplied evidence.
///
/// Evidence from `test_code` matching is unioned with the explicit executed
/// sets; neither side overrides the other. Missing evidence parameters default
/// to empty sets. A structurally invalid `source_code` propagates the
/// extractor's parse error unchanged.
pub fn analyze_coverage(
    source_code: &str,
    test_code: Option<&str>,
    executed_lines: Option<&BTreeSet<usize>>,
    executed_functions: Option<&BTreeSet<String>>,
    executed_classes: Option<&BTreeSet<String>>,
) -> Result<CoverageReport> {
    let inventory = extract_inventory(source_code)?;

    let mut line_evidence: BTreeSet<usize> = executed_lines.cloned().unwrap_or_default();
    let mut function_evidence: BTreeSet<String> = executed_functions.cloned().unwrap_or_default();
    let mut class_evidence: BTreeSet<String> = executed_classes.cloned().unwrap_or_default();
    let mut test_counts: BTreeMap<String, u32> = BTreeMap::new();

    if let Some(test_code) = test_code {
        let evidence = match_test_code(test_code, &inventory);
        line_evidence.extend(evidence.tested_lines);
        function_evidence.extend(evidence.tested_functions);
        class_evidence.extend(evidence.tested_classes);
        test_counts = evidence.test_counts;
    }

    // Discovery order: functions, then classes, then methods, each in source
    // order. The uncovered and high-complexity lists inherit this order.
    let mut items: Vec<CoverageItem> = Vec::new();
    for (name, span) in &inventory.functions {
        items.push(build_item(
            name,
            ItemKind::Function,
            *span,
            function_complexity(source_code, *span),
            &function_evidence,
            &line_evidence,
            &test_counts,
        ));
    }
    for (name, span) in &inventory.classes {
        items.push(build_item(
            name,
            ItemKind::Class,
            *span,
            class_complexity(source_code, *span),
            &class_evidence,
            &line_evidence,
            &test_counts,
        ));
    }
    for (name, span) in &inventory.methods {
        items.push(build_item(
            name,
            ItemKind::Method,
            *span,
            function_complexity(source_code, *span),
            &function_evidence,
            &line_evidence,
            &test_counts,
        ));
    }

    let covered_of = |kind: ItemKind| {
        items
            .iter()
            .filter(|item| item.kind == kind && item.is_covered)
            .count()
    };
    let covered_functions = covered_of(ItemKind::Function);
    let covered_classes = covered_of(ItemKind::Class);
    let covered_methods = covered_of(ItemKind::Method);

    let total_functions = inventory.functions.len();
    let total_classes = inventory.classes.len();
    let total_methods = inventory.methods.len();
    // An empty source still splits into one line.
    let total_lines = source_code.split('\n').count();
    // Raw evidence size: lines outside any declaration, or even beyond the
    // file, still count.
    let covered_lines = line_evidence.len();

    let covered_units = covered_functions + covered_classes + covered_methods + covered_lines;
    let total_units = total_functions + total_classes + total_methods + total_lines;
    let coverage_percentage = covered_units as f64 / total_units.max(1) as f64 * 100.0;

    let function_coverage: BTreeMap<String, bool> = items
        .iter()
        .filter(|item| item.kind == ItemKind::Function)
        .map(|item| (item.name.clone(), item.is_covered))
        .collect();
    let method_coverage: BTreeMap<String, bool> = items
        .iter()
        .filter(|item| item.kind == ItemKind::Method)
        .map(|item| (item.name.clone(), item.is_covered))
        .collect();

    let uncovered_items: Vec<CoverageItem> = items
        .iter()
        .filter(|item| !item.is_covered)
        .cloned()
        .collect();
    let high_complexity_items: Vec<CoverageItem> = items
        .iter()
        .filter(|item| item.complexity > HIGH_COMPLEXITY_THRESHOLD)
        .cloned()
        .collect();

    let branch_percentages = branch_coverage(source_code, &line_evidence);
    let suggestions = generate_suggestions(
        &uncovered_items,
        &high_complexity_items,
        coverage_percentage,
        &function_coverage,
        &method_coverage,
    );

    Ok(CoverageReport {
        total_functions,
        covered_functions,
        total_classes,
        covered_classes,
        total_methods,
        covered_methods,
        total_lines,
        covered_lines,
        coverage_percentage,
        uncovered_items,
        high_complexity_items,
        function_coverage,
        method_coverage,
        branch_coverage: branch_percentages,
        suggestions,
    })
}

/// Render the public summary view of a report, percentages 2-decimal rounded.
pub fn generate_coverage_report_summary(report: &CoverageReport) -> CoverageSummary {
    CoverageSummary {
        summary: SummaryPercentages {
            overall_coverage: round_percentage(report.coverage_percentage),
            function_coverage: kind_percentage(report.covered_functions, report.total_functions),
            class_coverage: kind_percentage(report.covered_classes, report.total_classes),
            method_coverage: kind_percentage(report.covered_methods, report.total_methods),
            line_coverage: kind_percentage(report.covered_lines, report.total_lines),
        },
        metrics: SummaryMetrics {
            total_functions: report.total_functions,
            covered_functions: report.covered_functions,
            total_classes: report.total_classes,
            covered_classes: report.covered_classes,
            total_methods: report.total_methods,
            covered_methods: report.covered_methods,
            total_lines: report.total_lines,
            covered_lines: report.covered_lines,
        },
        branch_coverage: report.branch_coverage.clone(),
        uncovered_count: report.uncovered_items.len(),
        high_complexity_count: report.high_complexity_items.len(),
        suggestions: report.suggestions.clone(),
    }
}

fn kind_percentage(covered: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_percentage(covered as f64 / total as f64 * 100.0)
}

fn build_item(
    name: &str,
    kind: ItemKind,
    span: LineSpan,
    complexity: u32,
    name_evidence: &BTreeSet<String>,
    line_evidence: &BTreeSet<usize>,
    test_counts: &BTreeMap<String, u32>,
) -> CoverageItem {
    let is_covered = name_evidence.contains(name) || span_intersects(span, line_evidence);
    CoverageItem {
        name: name.to_string(),
        kind,
        line_start: span.start,
        line_end: span.end,
        is_covered,
        complexity,
        test_count: test_counts.get(name).copied().unwrap_or(0),
        branches: Vec::new(),
    }
}

fn span_intersects(span: LineSpan, lines: &BTreeSet<usize>) -> bool {
    lines.range(span.start..=span.end).next().is_some()
}
