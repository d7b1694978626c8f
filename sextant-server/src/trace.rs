//! Request correlation tracing.
//!
//! Every request is stamped with an `X-Correlation-Id` (incoming header
//! honored, otherwise a fresh UUID) and its method, path, status and duration
//! are recorded into a bounded [`TraceStore`].

use std::collections::VecDeque;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Header carrying the request correlation identifier.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Correlation identifier attached to request extensions for handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// One request/response observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TraceRecord {
    /// Correlation identifier stamped on the request.
    pub correlation_id: String,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Handler duration in milliseconds.
    pub duration_ms: u64,
    /// RFC 3339 timestamp of the observation.
    pub recorded_at: String,
}

/// Bounded store of recent trace records.
///
/// Records expire after the configured TTL and are evicted on read; the
/// capacity bound drops the oldest record first.
#[derive(Debug)]
pub struct TraceStore<C: Clock = SystemClock> {
    clock: C,
    capacity: usize,
    ttl: Duration,
    records: Mutex<VecDeque<(Instant, TraceRecord)>>,
}

impl TraceStore<SystemClock> {
    /// Create a store with the given capacity and TTL on the system clock.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(SystemClock::new(), capacity, ttl)
    }
}

impl<C: Clock> TraceStore<C> {
    /// Create a store driven by a custom clock.
    pub fn with_clock(clock: C, capacity: usize, ttl: Duration) -> Self {
        Self {
            clock,
            capacity,
            ttl,
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a record, displacing the oldest when full.
    pub fn record(&self, record: TraceRecord) {
        let now = self.clock.now();
        let Ok(mut records) = self.records.lock() else {
            return;
        };
        while records.len() >= self.capacity && !records.is_empty() {
            records.pop_front();
        }
        records.push_back((now, record));
    }

    /// Recent records in arrival order, evicting expired ones first.
    pub fn recent(&self) -> Vec<TraceRecord> {
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

/// Middleware factory stamping correlation ids and recording traces.
pub struct CorrelationTracing {
    store: Arc<TraceStore>,
}

impl CorrelationTracing {
    /// Build the middleware around a shared trace store.
    pub fn new(store: Arc<TraceStore>) -> Self {
        Self { store }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorrelationTracing
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CorrelationTracingMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorrelationTracingMiddleware {
            service: Rc::new(service),
            store: Arc::clone(&self.store),
        }))
    }
}

/// Service wrapper produced by [`CorrelationTracing`].
pub struct CorrelationTracingMiddleware<S> {
    service: Rc<S>,
    store: Arc<TraceStore>,
}

impl<S, B> Service<ServiceRequest> for CorrelationTracingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<ServiceResponse<B>, Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            let started = Instant::now();
            let correlation_id = req
                .headers()
                .get(CORRELATION_HEADER)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            req.extensions_mut()
                .insert(CorrelationId(correlation_id.clone()));
            let method = req.method().to_string();
            let path = req.path().to_string();

            let mut response = service.call(req).await?;

            if let Ok(value) = HeaderValue::from_str(&correlation_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(CORRELATION_HEADER), value);
            }
            store.record(TraceRecord {
                correlation_id,
                method,
                path,
                status: response.status().as_u16(),
                duration_ms: started.elapsed().as_millis() as u64,
                recorded_at: Utc::now().to_rfc3339(),
            });
            Ok(response)
        })
    }
}
