#![deny(missing_docs)]
//! Sextant server executable.
//!
//! Hosts HTTP endpoints for heuristic code review and static coverage
//! analysis, with request correlation tracing and response caching.

mod cache;
mod clock;
mod models;
mod openapi;
mod routes;
mod trace;
mod validation;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;

#[allow(unused_imports)]
use std::str::FromStr;
#[cfg(not(test))]
use std::sync::Arc;
#[cfg(not(test))]
use std::time::Duration;

#[cfg(not(test))]
use crate::cache::ResponseCache;
#[cfg(not(test))]
use crate::routes::{
    AppState, analyze_coverage, analyze_review, health, openapi_json, traces, traces_clear,
    validation_errors, validation_errors_clear,
};
#[cfg(not(test))]
use crate::trace::{CorrelationTracing, TraceStore};
#[cfg(not(test))]
use crate::validation::ValidationErrorStore;

#[cfg(not(test))]
fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(not(test))]
fn env_secs(name: &str, default: u64) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let state = web::Data::new(AppState {
        cache: Arc::new(ResponseCache::new(
            env_usize("SEXTANT_CACHE_CAPACITY", 256),
            env_secs("SEXTANT_CACHE_TTL_SECS", 300),
        )),
        traces: Arc::new(TraceStore::new(
            env_usize("SEXTANT_TRACE_CAPACITY", 512),
            env_secs("SEXTANT_TRACE_TTL_SECS", 3600),
        )),
        validation_errors: Arc::new(ValidationErrorStore::new(
            env_usize("SEXTANT_VALIDATION_CAPACITY", 256),
            env_secs("SEXTANT_VALIDATION_TTL_SECS", 3600),
        )),
    });

    let origins = std::env::var("SEXTANT_UI_ORIGINS")
        .unwrap_or_else(|_| "http://127.0.0.1:4200,http://localhost:4200".to_string());
    let allowed_origins: Vec<String> = origins
        .split(',')
        .map(|value| value.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    let listen_addr = std::env::var("SEXTANT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listen_port =
        u16::from_str(&std::env::var("SEXTANT_PORT").unwrap_or_else(|_| "8080".to_string()))
            .expect("SEXTANT_PORT must be a u16 number");
    let err_msg = format!("Can't bind {}:{}", &listen_addr, listen_port);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .wrap(CorrelationTracing::new(state.traces.clone()))
                .app_data(state.clone())
                .service(analyze_review)
                .service(analyze_coverage)
                .service(health)
                .service(traces)
                .service(traces_clear)
                .service(validation_errors)
                .service(validation_errors_clear)
                .service(openapi_json)
        })
        .bind((listen_addr, listen_port))
        .expect(&err_msg)
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
