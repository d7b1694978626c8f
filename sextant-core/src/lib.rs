#![deny(missing_docs)]
//! Sextant core library.
//!
//! This crate contains the static coverage estimator and the heuristic code
//! reviewer that power the Sextant analysis service. Everything here is pure
//! computation over in-memory text: callers supply source code and coverage
//! evidence, and get back an immutable report.

pub mod branches;
pub mod complexity;
pub mod coverage;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod matcher;
pub mod review;
pub mod suggest;

pub use branches::branch_coverage;
pub use complexity::{class_complexity, function_complexity};
pub use coverage::{analyze_coverage, generate_coverage_report_summary};
pub use domain::{
    BranchMark, BranchPercentages, CoverageItem, CoverageReport, CoverageSummary, ItemKind,
    ReviewIssue, ReviewResult, Severity, SummaryMetrics, SummaryPercentages,
};
pub use error::{AnalysisError, Result};
pub use extractor::{LineSpan, SourceInventory, extract_inventory};
pub use matcher::{TestEvidence, match_test_code};
pub use review::review_code;
pub use suggest::generate_suggestions;
