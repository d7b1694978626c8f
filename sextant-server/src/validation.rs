//! Request validation and the bounded validation-failure store.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::clock::{Clock, SystemClock};
use crate::models::{CoverageRequest, ReviewRequest};

/// Maximum accepted size of any analyzed text, in bytes.
pub const MAX_CONTENT_BYTES: usize = 1_000_000;

/// Languages the review endpoint accepts.
pub const ALLOWED_LANGUAGES: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "rust",
    "go",
    "java",
    "c",
    "cpp",
    "ruby",
    "php",
];

/// A single request-validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field that failed validation.
    pub field: &'static str,
    /// Why the request was rejected.
    pub message: String,
}

/// A rejected request, as stored for later inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationRecord {
    /// Correlation id of the rejected request, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Endpoint path the rejected request targeted.
    pub path: String,
    /// Field that failed validation.
    pub field: String,
    /// Why the request was rejected.
    pub message: String,
    /// RFC 3339 timestamp of the rejection.
    pub recorded_at: String,
}

/// Validate a review request body.
pub fn validate_review_request(request: &ReviewRequest) -> Result<(), ValidationIssue> {
    if request.content.trim().is_empty() {
        return Err(ValidationIssue {
            field: "content",
            message: "content is required".to_string(),
        });
    }
    if request.content.len() > MAX_CONTENT_BYTES {
        return Err(ValidationIssue {
            field: "content",
            message: format!("content exceeds {MAX_CONTENT_BYTES} bytes"),
        });
    }
    let language = request.language.to_lowercase();
    if !ALLOWED_LANGUAGES.contains(&language.as_str()) {
        return Err(ValidationIssue {
            field: "language",
            message: format!("unsupported language: {}", request.language),
        });
    }
    Ok(())
}

/// Validate a coverage request body.
///
/// An empty `source_code` is accepted: the engine defines a deterministic
/// zero-valued report for it.
pub fn validate_coverage_request(request: &CoverageRequest) -> Result<(), ValidationIssue> {
    if request.source_code.len() > MAX_CONTENT_BYTES {
        return Err(ValidationIssue {
            field: "source_code",
            message: format!("source_code exceeds {MAX_CONTENT_BYTES} bytes"),
        });
    }
    if let Some(test_code) = &request.test_code {
        if test_code.len() > MAX_CONTENT_BYTES {
            return Err(ValidationIssue {
                field: "test_code",
                message: format!("test_code exceeds {MAX_CONTENT_BYTES} bytes"),
            });
        }
    }
    Ok(())
}

/// Bounded store of recent validation failures.
#[derive(Debug)]
pub struct ValidationErrorStore<C: Clock = SystemClock> {
    clock: C,
    capacity: usize,
    ttl: Duration,
    records: Mutex<VecDeque<(Instant, ValidationRecord)>>,
}

impl ValidationErrorStore<SystemClock> {
    /// Create a store with the given capacity and TTL on the system clock.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(SystemClock::new(), capacity, ttl)
    }
}

impl<C: Clock> ValidationErrorStore<C> {
    /// Create a store driven by a custom clock.
    pub fn with_clock(clock: C, capacity: usize, ttl: Duration) -> Self {
        Self {
            clock,
            capacity,
            ttl,
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Record a rejection observed at `path`.
    pub fn record(&self, path: &str, correlation_id: Option<String>, issue: &ValidationIssue) {
        let now = self.clock.now();
        let Ok(mut records) = self.records.lock() else {
            return;
        };
        while records.len() >= self.capacity && !records.is_empty() {
            records.pop_front();
        }
        records.push_back((
            now,
            ValidationRecord {
                correlation_id,
                path: path.to_string(),
                field: issue.field.to_string(),
                message: issue.message.clone(),
                recorded_at: Utc::now().to_rfc3339(),
            },
        ));
    }

    /// Recent failures in arrival order, evicting expired ones first.
    pub fn recent(&self) -> Vec<ValidationRecord> {
        let now = self.clock.now();
        let Ok(mut records) = self.records.lock() else {
            return Vec::new();
        };
        while records
            .front()
            .is_some_and(|(stored_at, _)| now.duration_since(*stored_at) >= self.ttl)
        {
            records.pop_front();
        }
        records.iter().map(|(_, record)| record.clone()).collect()
    }

    /// Drop every record, returning how many were removed.
    pub fn clear(&self) -> usize {
        let Ok(mut records) = self.records.lock() else {
            return 0;
        };
        let cleared = records.len();
        records.clear();
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MAX_CONTENT_BYTES, ValidationErrorStore, ValidationIssue, validate_coverage_request,
        validate_review_request,
    };
    use crate::clock::MockClock;
    use crate::models::{CoverageRequest, ReviewRequest};
    use std::time::{Duration, Instant};

    fn review(content: &str, language: &str) -> ReviewRequest {
        ReviewRequest {
            content: content.to_string(),
            language: language.to_string(),
        }
    }

    fn coverage(source_code: &str) -> CoverageRequest {
        CoverageRequest {
            source_code: source_code.to_string(),
            test_code: None,
            executed_lines: None,
            executed_functions: None,
            executed_classes: None,
        }
    }

    #[test]
    fn accepts_a_well_formed_review_request() {
        assert!(validate_review_request(&review("x = 1", "python")).is_ok());
        assert!(validate_review_request(&review("x = 1", "Python")).is_ok());
    }

    #[test]
    fn rejects_blank_review_content() {
        let issue = validate_review_request(&review("   ", "python")).expect_err("rejected");
        assert_eq!(issue.field, "content");
    }

    #[test]
    fn rejects_unsupported_language() {
        let issue = validate_review_request(&review("x = 1", "cobol")).expect_err("rejected");
        assert_eq!(issue.field, "language");
        assert!(issue.message.contains("cobol"));
    }

    #[test]
    fn rejects_oversized_content() {
        let oversized = "x".repeat(MAX_CONTENT_BYTES + 1);
        let issue = validate_review_request(&review(&oversized, "python")).expect_err("rejected");
        assert_eq!(issue.field, "content");
    }

    #[test]
    fn coverage_accepts_empty_source() {
        assert!(validate_coverage_request(&coverage("")).is_ok());
    }

    #[test]
    fn coverage_rejects_oversized_test_code() {
        let mut request = coverage("def f():\n    pass");
        request.test_code = Some("y".repeat(MAX_CONTENT_BYTES + 1));
        let issue = validate_coverage_request(&request).expect_err("rejected");
        assert_eq!(issue.field, "test_code");
    }

    #[test]
    fn store_keeps_rejections_in_arrival_order() {
        let store = ValidationErrorStore::new(8, Duration::from_secs(3600));
        let issue = ValidationIssue {
            field: "content",
            message: "content is required".to_string(),
        };
        store.record("/api/analyze/review", Some("cid-1".to_string()), &issue);
        store.record("/api/analyze/review", None, &issue);

        let recent = store.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].correlation_id.as_deref(), Some("cid-1"));
        assert_eq!(recent[1].correlation_id, None);
    }

    #[test]
    fn store_expires_records_by_ttl() {
        let base = Instant::now();
        let mut clock = MockClock::new();
        let mut seq = mockall::Sequence::new();
        clock
            .expect_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(base);
        clock
            .expect_now()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(base + Duration::from_secs(7200));

        let store = ValidationErrorStore::with_clock(clock, 8, Duration::from_secs(3600));
        let issue = ValidationIssue {
            field: "content",
            message: "content is required".to_string(),
        };
        store.record("/api/analyze/review", None, &issue);

        assert!(store.recent().is_empty());
    }
}
