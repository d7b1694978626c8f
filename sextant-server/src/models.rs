//! Request and response payloads for the Sextant server.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::trace::TraceRecord;
use crate::validation::ValidationRecord;

/// Request payload for a heuristic code review.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// Source text to review.
    pub content: String,
    /// Language the source is written in.
    pub language: String,
}

/// Request payload for a coverage analysis.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverageRequest {
    /// Source text to analyze.
    pub source_code: String,
    /// Optional test source to infer coverage evidence from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_code: Option<String>,
    /// Explicit executed-line evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_lines: Option<Vec<usize>>,
    /// Explicit executed-function evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_functions: Option<Vec<String>>,
    /// Explicit executed-class evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_classes: Option<Vec<String>>,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Liveness payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status, always `ok` when reachable.
    pub status: String,
    /// Server crate version.
    pub version: String,
}

/// Recent trace records payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TraceListResponse {
    /// Trace records in arrival order.
    pub traces: Vec<TraceRecord>,
}

/// Recent validation failures payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorListResponse {
    /// Validation failures in arrival order.
    pub errors: Vec<ValidationRecord>,
}

/// Result of clearing a bounded store.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    /// Number of records removed.
    pub cleared: usize,
}
