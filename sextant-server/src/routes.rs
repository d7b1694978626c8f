//! HTTP handlers for the Sextant server.

use std::collections::BTreeSet;
use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, delete, get, post, web};
use sextant_core::{AnalysisError, CoverageSummary, ReviewResult};
use utoipa::OpenApi;

use crate::cache::{ResponseCache, cache_key};
use crate::models::{
    ClearResponse, CoverageRequest, ErrorResponse, HealthResponse, ReviewRequest,
    TraceListResponse, ValidationErrorListResponse,
};
use crate::openapi::ApiDoc;
use crate::trace::{CorrelationId, TraceStore};
use crate::validation::{
    ValidationErrorStore, validate_coverage_request, validate_review_request,
};

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response cache for the analysis endpoints.
    pub cache: Arc<ResponseCache>,
    /// Correlation trace store.
    pub traces: Arc<TraceStore>,
    /// Validation failure store.
    pub validation_errors: Arc<ValidationErrorStore>,
}

fn correlation_id(req: &HttpRequest) -> Option<String> {
    req.extensions()
        .get::<CorrelationId>()
        .map(|id| id.0.clone())
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse { message })
}

fn encoding_failure(err: serde_json::Error) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        message: format!("failed to encode payload: {err}"),
    })
}

fn json_with_cache_status(body: String, status: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("X-Cache", status))
        .content_type("application/json")
        .body(body)
}

#[utoipa::path(
    post,
    path = "/analyze/review",
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review result", body = ReviewResult),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "analyze"
)]
#[post("/api/analyze/review")]
/// Run the heuristic line reviewer over a source payload.
pub async fn analyze_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ReviewRequest>,
) -> impl Responder {
    if let Err(issue) = validate_review_request(&payload) {
        log::warn!("review request rejected: {}", issue.message);
        state
            .validation_errors
            .record(req.path(), correlation_id(&req), &issue);
        return bad_request(issue.message);
    }
    let canonical = match serde_json::to_string(&payload.0) {
        Ok(canonical) => canonical,
        Err(err) => return encoding_failure(err),
    };
    let key = cache_key(req.path(), &canonical);
    if let Some(body) = state.cache.get(&key) {
        log::debug!("cache hit for {}", req.path());
        return json_with_cache_status(body, "HIT");
    }

    let result = sextant_core::review_code(&payload.content, &payload.language);
    match serde_json::to_string(&result) {
        Ok(body) => {
            state.cache.insert(key, body.clone());
            json_with_cache_status(body, "MISS")
        }
        Err(err) => encoding_failure(err),
    }
}

#[utoipa::path(
    post,
    path = "/analyze/coverage",
    request_body = CoverageRequest,
    responses(
        (status = 200, description = "Coverage summary", body = CoverageSummary),
        (status = 400, description = "Invalid request or unparsable source", body = ErrorResponse)
    ),
    tag = "analyze"
)]
#[post("/api/analyze/coverage")]
/// Estimate test coverage for a source payload.
pub async fn analyze_coverage(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<CoverageRequest>,
) -> impl Responder {
    if let Err(issue) = validate_coverage_request(&payload) {
        log::warn!("coverage request rejected: {}", issue.message);
        state
            .validation_errors
            .record(req.path(), correlation_id(&req), &issue);
        return bad_request(issue.message);
    }
    let canonical = match serde_json::to_string(&payload.0) {
        Ok(canonical) => canonical,
        Err(err) => return encoding_failure(err),
    };
    let key = cache_key(req.path(), &canonical);
    if let Some(body) = state.cache.get(&key) {
        log::debug!("cache hit for {}", req.path());
        return json_with_cache_status(body, "HIT");
    }

    let executed_lines: Option<BTreeSet<usize>> = payload
        .executed_lines
        .as_ref()
        .map(|lines| lines.iter().copied().collect());
    let executed_functions: Option<BTreeSet<String>> = payload
        .executed_functions
        .as_ref()
        .map(|names| names.iter().cloned().collect());
    let executed_classes: Option<BTreeSet<String>> = payload
        .executed_classes
        .as_ref()
        .map(|names| names.iter().cloned().collect());

    let report = match sextant_core::analyze_coverage(
        &payload.source_code,
        payload.test_code.as_deref(),
        executed_lines.as_ref(),
        executed_functions.as_ref(),
        executed_classes.as_ref(),
    ) {
        Ok(report) => report,
        // Malformed input is a client error; the engine does not recover it.
        Err(error @ AnalysisError::Parse { .. }) => {
            log::warn!("coverage analysis failed: {error}");
            return bad_request(error.to_string());
        }
        Err(error) => {
            return HttpResponse::InternalServerError().json(ErrorResponse {
                message: error.to_string(),
            });
        }
    };
    let summary = sextant_core::generate_coverage_report_summary(&report);
    match serde_json::to_string(&summary) {
        Ok(body) => {
            state.cache.insert(key, body.clone());
            json_with_cache_status(body, "MISS")
        }
        Err(err) => encoding_failure(err),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Liveness", body = HealthResponse)),
    tag = "system"
)]
#[get("/api/health")]
/// Report service liveness and version.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/traces",
    responses((status = 200, description = "Recent traces", body = TraceListResponse)),
    tag = "system"
)]
#[get("/api/traces")]
/// List recent request traces.
pub async fn traces(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(TraceListResponse {
        traces: state.traces.recent(),
    })
}

#[utoipa::path(
    delete,
    path = "/traces",
    responses((status = 200, description = "Traces cleared", body = ClearResponse)),
    tag = "system"
)]
#[delete("/api/traces")]
/// Clear the trace store.
pub async fn traces_clear(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ClearResponse {
        cleared: state.traces.clear(),
    })
}

#[utoipa::path(
    get,
    path = "/validation/errors",
    responses(
        (status = 200, description = "Recent validation failures", body = ValidationErrorListResponse)
    ),
    tag = "system"
)]
#[get("/api/validation/errors")]
/// List recent request-validation failures.
pub async fn validation_errors(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ValidationErrorListResponse {
        errors: state.validation_errors.recent(),
    })
}

#[utoipa::path(
    delete,
    path = "/validation/errors",
    responses((status = 200, description = "Failures cleared", body = ClearResponse)),
    tag = "system"
)]
#[delete("/api/validation/errors")]
/// Clear the validation-failure store.
pub async fn validation_errors_clear(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ClearResponse {
        cleared: state.validation_errors.clear(),
    })
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses((status = 200, description = "OpenAPI document")),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
