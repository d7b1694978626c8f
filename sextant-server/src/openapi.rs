//! OpenAPI specification for the Sextant server.

use utoipa::OpenApi;

use sextant_core::{
    BranchMark, CoverageItem, CoverageSummary, ItemKind, ReviewIssue, ReviewResult, Severity,
    SummaryMetrics, SummaryPercentages,
};

use crate::models::{
    ClearResponse, CoverageRequest, ErrorResponse, HealthResponse, ReviewRequest,
    TraceListResponse, ValidationErrorListResponse,
};
use crate::trace::TraceRecord;
use crate::validation::ValidationRecord;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::analyze_review,
        crate::routes::analyze_coverage,
        crate::routes::health,
        crate::routes::traces,
        crate::routes::traces_clear,
        crate::routes::validation_errors,
        crate::routes::validation_errors_clear,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            ReviewRequest,
            CoverageRequest,
            ErrorResponse,
            HealthResponse,
            TraceListResponse,
            ValidationErrorListResponse,
            ClearResponse,
            TraceRecord,
            ValidationRecord,
            CoverageSummary,
            SummaryPercentages,
            SummaryMetrics,
            CoverageItem,
            BranchMark,
            ItemKind,
            ReviewResult,
            ReviewIssue,
            Severity
        )
    ),
    tags(
        (name = "analyze", description = "Source analysis"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the Sextant server.
pub struct ApiDoc;
