//! Remediation suggestions derived from an aggregated coverage report.

use std::collections::BTreeMap;

use crate::domain::{CoverageItem, ItemKind};

/// How many uncovered functions the priority suggestion names.
const PRIORITY_FUNCTION_LIMIT: usize = 5;
/// How many high-complexity items get called out.
const HIGH_COMPLEXITY_LIMIT: usize = 3;
/// Fraction of untested functions above which a testing pass is suggested.
const UNTESTED_FUNCTION_RATIO: f64 = 0.3;

/// Build the ordered suggestion list for a coverage report.
///
/// Rules fire independently and append in a fixed order; a rule whose
/// condition is false emits nothing.
pub fn generate_suggestions(
    uncovered_items: &[CoverageItem],
    high_complexity_items: &[CoverageItem],
    coverage_percentage: f64,
    function_map: &BTreeMap<String, bool>,
    method_map: &BTreeMap<String, bool>,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    if coverage_percentage < 50.0 {
        suggestions.push(
            "Critical: overall coverage is below 50%. Add tests before shipping further changes."
                .to_string(),
        );
    } else if coverage_percentage < 80.0 {
        suggestions.push(
            "Warning: overall coverage is below 80%. Consider adding tests for recent changes."
                .to_string(),
        );
    }

    let uncovered_functions: Vec<&CoverageItem> = uncovered_items
        .iter()
        .filter(|item| item.kind == ItemKind::Function)
        .collect();
    if !uncovered_functions.is_empty() {
        // Stable sort: equal complexities keep their discovery order.
        let mut ranked = uncovered_functions.clone();
        ranked.sort_by(|a, b| b.complexity.cmp(&a.complexity));
        let names = ranked
            .iter()
            .take(PRIORITY_FUNCTION_LIMIT)
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        suggestions.push(format!("Priority: add tests for untested functions: {names}"));
    }

    let uncovered_methods = uncovered_items
        .iter()
        .filter(|item| item.kind == ItemKind::Method)
        .count();
    if uncovered_methods > 0 {
        suggestions.push(format!(
            "{uncovered_methods} of {} declared methods lack test coverage.",
            method_map.len()
        ));
    }

    if !high_complexity_items.is_empty() {
        let names = high_complexity_items
            .iter()
            .take(HIGH_COMPLEXITY_LIMIT)
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        suggestions.push(format!("High-complexity code should be tested first: {names}"));
    }

    let total_functions = function_map.len();
    if total_functions > 0 {
        let untested_ratio = uncovered_functions.len() as f64 / total_functions as f64;
        if untested_ratio > UNTESTED_FUNCTION_RATIO {
            suggestions.push(
                "Over 30% of functions are untested; schedule a dedicated testing pass."
                    .to_string(),
            );
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::generate_suggestions;
    use crate::domain::{CoverageItem, ItemKind};
    use std::collections::BTreeMap;

    fn uncovered_function(name: &str, complexity: u32) -> CoverageItem {
        CoverageItem {
            name: name.to_string(),
            kind: ItemKind::Function,
            line_start: 1,
            line_end: 1,
            is_covered: false,
            complexity,
            test_count: 0,
            branches: Vec::new(),
        }
    }

    fn uncovered_method(name: &str) -> CoverageItem {
        CoverageItem {
            kind: ItemKind::Method,
            ..uncovered_function(name, 1)
        }
    }

    fn function_map(names: &[&str]) -> BTreeMap<String, bool> {
        names.iter().map(|name| (name.to_string(), false)).collect()
    }

    #[test]
    fn priority_suggestion_ranks_by_descending_complexity() {
        let uncovered = vec![
            uncovered_function("a", 5),
            uncovered_function("b", 12),
            uncovered_function("c", 7),
            uncovered_function("d", 20),
        ];
        let suggestions = generate_suggestions(
            &uncovered,
            &[],
            40.0,
            &function_map(&["a", "b", "c", "d"]),
            &BTreeMap::new(),
        );

        let priority = suggestions
            .iter()
            .find(|s| s.starts_with("Priority"))
            .expect("priority suggestion");
        assert!(priority.ends_with("d, b, c, a"));
    }

    #[test]
    fn equal_complexities_keep_discovery_order() {
        let uncovered = vec![
            uncovered_function("early", 3),
            uncovered_function("late", 3),
            uncovered_function("peak", 9),
        ];
        let suggestions = generate_suggestions(
            &uncovered,
            &[],
            90.0,
            &function_map(&["early", "late", "peak"]),
            &BTreeMap::new(),
        );

        let priority = suggestions
            .iter()
            .find(|s| s.starts_with("Priority"))
            .expect("priority suggestion");
        assert!(priority.ends_with("peak, early, late"));
    }

    #[test]
    fn low_coverage_thresholds_are_mutually_exclusive() {
        let below_fifty =
            generate_suggestions(&[], &[], 40.0, &BTreeMap::new(), &BTreeMap::new());
        assert_eq!(below_fifty.len(), 1);
        assert!(below_fifty[0].contains("below 50%"));

        let below_eighty =
            generate_suggestions(&[], &[], 65.0, &BTreeMap::new(), &BTreeMap::new());
        assert_eq!(below_eighty.len(), 1);
        assert!(below_eighty[0].contains("below 80%"));

        let healthy = generate_suggestions(&[], &[], 95.0, &BTreeMap::new(), &BTreeMap::new());
        assert!(healthy.is_empty());
    }

    #[test]
    fn uncovered_methods_are_counted() {
        let uncovered = vec![uncovered_method("A.x"), uncovered_method("A.y")];
        let method_map: BTreeMap<String, bool> = [
            ("A.x".to_string(), false),
            ("A.y".to_string(), false),
            ("A.z".to_string(), true),
        ]
        .into_iter()
        .collect();
        let suggestions =
            generate_suggestions(&uncovered, &[], 95.0, &BTreeMap::new(), &method_map);

        assert!(suggestions.iter().any(|s| s.contains("2 of 3 declared methods")));
    }

    #[test]
    fn high_complexity_names_first_three_in_input_order() {
        let complex: Vec<_> = ["w", "x", "y", "z"]
            .iter()
            .map(|name| uncovered_function(name, 15))
            .collect();
        let suggestions =
            generate_suggestions(&[], &complex, 95.0, &BTreeMap::new(), &BTreeMap::new());

        let callout = suggestions
            .iter()
            .find(|s| s.starts_with("High-complexity"))
            .expect("complexity suggestion");
        assert!(callout.ends_with("w, x, y"));
    }

    #[test]
    fn untested_ratio_over_threshold_triggers_suggestion() {
        let uncovered = vec![uncovered_function("a", 1), uncovered_function("b", 1)];
        let suggestions = generate_suggestions(
            &uncovered,
            &[],
            95.0,
            &function_map(&["a", "b", "c", "d", "e"]),
            &BTreeMap::new(),
        );

        assert!(suggestions.iter().any(|s| s.contains("Over 30%")));

        let few_uncovered = vec![uncovered_function("a", 1)];
        let quiet = generate_suggestions(
            &few_uncovered,
            &[],
            95.0,
            &function_map(&["a", "b", "c", "d", "e"]),
            &BTreeMap::new(),
        );
        assert!(!quiet.iter().any(|s| s.contains("Over 30%")));
    }
}
