//! Shared in-process stub backend for the integration tests.
//!
//! Serves the three endpoints the controller probes (plus the populate side
//! call) on an ephemeral local port, with behavior scriptable per test
//! through [`StubBackend`]. Keeping the backend in-process makes the
//! scenarios hermetic: no real network, no shared fixtures.

#![allow(dead_code)] // Each test binary uses a different slice of this module.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use lib_sourcemode::SourceModeConfig;

/// One scripted answer for the health endpoint, consumed front-to-back.
#[derive(Clone, Copy)]
pub struct HealthPlan {
    /// Artificial latency before answering.
    pub delay: Duration,
    /// Whether to answer 200 (true) or 503 (false).
    pub ok: bool,
}

/// Scriptable behavior and hit counters for one stub backend instance.
pub struct StubBackend {
    /// When no plan is queued: health answers 503 if set, 200 otherwise.
    pub health_failing: AtomicBool,
    /// Per-request health scripts; empty falls back to `health_failing`.
    pub health_plans: Mutex<VecDeque<HealthPlan>>,
    pub health_hits: AtomicUsize,

    /// When false the status endpoint answers 404, forcing the cascade on.
    pub status_enabled: AtomicBool,
    pub status_allowed: AtomicBool,
    pub status_blockers: Mutex<Vec<String>>,
    /// Per-request artificial latency for the status endpoint; empty means
    /// answer immediately. The answer reflects the flags at request arrival.
    pub status_delays: Mutex<VecDeque<Duration>>,
    pub status_hits: AtomicUsize,

    /// When false the sources endpoint answers 404.
    pub sources_enabled: AtomicBool,
    pub sources_healthy: AtomicI64,
    pub sources_total: AtomicI64,
    pub sources_hits: AtomicUsize,

    pub populate_hits: AtomicUsize,
}

impl StubBackend {
    /// A backend whose status endpoint allows Live with no blockers.
    pub fn allowing_live() -> Arc<Self> {
        Arc::new(Self {
            health_failing: AtomicBool::new(false),
            health_plans: Mutex::new(VecDeque::new()),
            health_hits: AtomicUsize::new(0),
            status_enabled: AtomicBool::new(true),
            status_allowed: AtomicBool::new(true),
            status_blockers: Mutex::new(Vec::new()),
            status_delays: Mutex::new(VecDeque::new()),
            status_hits: AtomicUsize::new(0),
            sources_enabled: AtomicBool::new(true),
            sources_healthy: AtomicI64::new(3),
            sources_total: AtomicI64::new(3),
            sources_hits: AtomicUsize::new(0),
            populate_hits: AtomicUsize::new(0),
        })
    }

    /// A backend whose status endpoint denies Live with the given blockers.
    pub fn denying_live(blockers: &[&str]) -> Arc<Self> {
        let stub = Self::allowing_live();
        stub.status_allowed.store(false, Ordering::SeqCst);
        *stub.status_blockers.lock().unwrap() =
            blockers.iter().map(|b| b.to_string()).collect();
        stub
    }
}

/// Binds the stub on an ephemeral port and returns its base URL
/// (with a trailing slash, ready for `SourceModeConfig`).
pub async fn spawn_backend(stub: Arc<StubBackend>) -> String {
    let app = Router::new()
        .route("/health/", get(health))
        .route("/health/sources", get(sources))
        .route("/api/live-mode/status", get(live_status))
        .route("/api/live-mode/populate", post(populate))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend serve");
    });

    format!("http://{}/", addr)
}

/// Routes `log` output through the test harness (`RUST_LOG` controls the
/// level). Safe to call from every test; only the first call wins.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A controller configuration aimed at the stub, with intervals and the
/// transition animation shortened so scenarios complete quickly.
pub fn test_config(base: &str, persist_dir: &std::path::Path) -> SourceModeConfig {
    init_logging();
    let mut cfg = SourceModeConfig::new(base, &format!("{}api/", base)).expect("test config");
    cfg.probe_timeout = Duration::from_secs(2);
    cfg.health_interval = Duration::from_millis(200);
    cfg.auth_interval = Duration::from_millis(400);
    cfg.transition_step_delay = Duration::from_millis(5);
    cfg.persist_path = persist_dir.join("data_source_mode");
    cfg
}

async fn health(State(stub): State<Arc<StubBackend>>) -> StatusCode {
    stub.health_hits.fetch_add(1, Ordering::SeqCst);
    let plan = stub.health_plans.lock().unwrap().pop_front();
    let (delay, ok) = match plan {
        Some(plan) => (plan.delay, plan.ok),
        None => (
            Duration::ZERO,
            !stub.health_failing.load(Ordering::SeqCst),
        ),
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn live_status(State(stub): State<Arc<StubBackend>>) -> Response {
    stub.status_hits.fetch_add(1, Ordering::SeqCst);
    if !stub.status_enabled.load(Ordering::SeqCst) {
        return StatusCode::NOT_FOUND.into_response();
    }
    // Snapshot the answer before any scripted latency, so a slow response
    // carries the values that were current when the request arrived.
    let can_go_live = stub.status_allowed.load(Ordering::SeqCst);
    let blockers = stub.status_blockers.lock().unwrap().clone();
    let delay = stub.status_delays.lock().unwrap().pop_front();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(json!({
        "can_go_live": can_go_live,
        "blockers": blockers,
        "message": "stub status",
    }))
    .into_response()
}

async fn sources(State(stub): State<Arc<StubBackend>>) -> Response {
    stub.sources_hits.fetch_add(1, Ordering::SeqCst);
    if !stub.sources_enabled.load(Ordering::SeqCst) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "healthy_count": stub.sources_healthy.load(Ordering::SeqCst),
        "total_sources": stub.sources_total.load(Ordering::SeqCst),
    }))
    .into_response()
}

async fn populate(State(stub): State<Arc<StubBackend>>) -> StatusCode {
    stub.populate_hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}
