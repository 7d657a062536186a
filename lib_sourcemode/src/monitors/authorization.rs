//! # Live Authorization Checker
//!
//! Periodically asks the backend whether Live mode is permitted at all,
//! independent of whether the user wants to use it. The poll runs regardless
//! of the current mode, because the user must be able to discover that Live
//! has become available while sitting in Demo.
//!
//! The backend is authoritative: the verdict is computed exclusively from the
//! fallback cascade below, never from a local heuristic.
//!
//! ## Fallback cascade (at most three probes, in order):
//! 1. The dedicated authorization endpoint, which states the verdict and its
//!    blockers directly.
//! 2. The aggregate sources-health endpoint: Live is viable when any source
//!    is healthy, or when the deployment has no sources registered at all.
//! 3. The bare liveness endpoint: a reachable backend is assumed willing, an
//!    unreachable one blocks Live outright.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourceModeConfig;
use crate::core::state::ModeStore;
use crate::retrieve::probe_http::ProbeClient;

/// Blocker recorded when a denial arrives without any reported reasons.
pub const DEFAULT_BLOCKER: &str = "Live data is currently unavailable";
/// Blocker recorded when the whole cascade fails to reach the backend.
pub const UNREACHABLE_BLOCKER: &str = "cannot reach backend";
/// Blocker recorded when the sources-health fallback reports nothing healthy.
pub const NO_SOURCES_BLOCKER: &str = "No healthy data sources";

/// Wire schema of the dedicated authorization-status endpoint.
#[derive(Debug, Deserialize)]
pub struct LiveStatusResponse {
    /// The backend's direct verdict.
    pub can_go_live: bool,
    /// Ordered human-readable reasons Live is blocked.
    #[serde(default)]
    pub blockers: Vec<String>,
    /// Optional detail accompanying the verdict.
    #[serde(default)]
    pub message: Option<String>,
}

/// Wire schema of the public sources-health fallback endpoint.
#[derive(Debug, Deserialize)]
pub struct SourcesHealthResponse {
    /// Number of upstream sources currently healthy.
    pub healthy_count: i64,
    /// Number of upstream sources registered.
    pub total_sources: i64,
}

/// Outcome of one cascade evaluation, before it is committed to the store.
#[derive(Debug)]
struct AuthVerdict {
    allowed: bool,
    blockers: Vec<String>,
    message: Option<String>,
}

/// The authorization poll loop and its one-shot check entry point.
pub struct LiveAuthChecker {
    config: Arc<SourceModeConfig>,
    store: Arc<ModeStore>,
    client: Arc<ProbeClient>,
    shutdown: CancellationToken,
    /// Token of the check currently in flight; superseded like a health probe.
    inflight: Mutex<CancellationToken>,
}

impl LiveAuthChecker {
    /// Creates the checker. Check tokens are children of `shutdown`.
    pub fn new(
        config: Arc<SourceModeConfig>,
        store: Arc<ModeStore>,
        client: Arc<ProbeClient>,
        shutdown: CancellationToken,
    ) -> Self {
        let inflight = Mutex::new(shutdown.child_token());
        Self {
            config,
            store,
            client,
            shutdown,
            inflight,
        }
    }

    /// Poll loop. The first check runs immediately so a cold start discovers
    /// Live availability without waiting a full interval.
    pub async fn run(&self) {
        log::info!(
            "Live authorization checker started (interval {}s)",
            self.config.auth_interval.as_secs()
        );
        loop {
            self.check_now().await;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    log::debug!("Live authorization checker stopped");
                    break;
                }
                _ = tokio::time::sleep(self.config.auth_interval) => {}
            }
        }
    }

    /// Runs one authorization check, superseding any check still in flight,
    /// and commits the verdict atomically.
    ///
    /// Also invoked out-of-band: by the transition coordinator after a
    /// rejected Live switch, and through the manager when a UI retry button
    /// wants an awaitable recheck.
    pub async fn check_now(&self) {
        let token = self.supersede();

        let verdict = tokio::select! {
            // Cancellation covers every attempt of the cascade. Swallow.
            _ = token.cancelled() => return,
            verdict = self.evaluate() => verdict,
        };

        self.store
            .update(|state| {
                if token.is_cancelled() {
                    return;
                }
                let AuthVerdict {
                    allowed,
                    blockers,
                    message,
                } = verdict;

                state.live_allowed = allowed;
                // Blockers are empty exactly when Live is allowed; a denial
                // with no reported reasons gets the default blocker.
                state.live_blockers = if allowed {
                    Vec::new()
                } else if blockers.is_empty() {
                    vec![DEFAULT_BLOCKER.to_string()]
                } else {
                    blockers
                };
                state.live_status_message = message;
                state.live_status_checked_at = Some(Utc::now());
                log::debug!(
                    "Live authorization verdict: allowed={}, blockers={:?}",
                    state.live_allowed,
                    state.live_blockers
                );
            })
            .await;
    }

    /// The fallback cascade. Each step that fails hands over to the next;
    /// the final step always yields a verdict.
    async fn evaluate(&self) -> AuthVerdict {
        // 1. Dedicated status endpoint: the backend states its verdict.
        match self
            .client
            .get_json::<LiveStatusResponse>(&self.config.live_status_url)
            .await
        {
            Ok(status) => {
                return AuthVerdict {
                    allowed: status.can_go_live,
                    blockers: status.blockers,
                    message: status.message,
                };
            }
            Err(err) => {
                log::debug!("Live status endpoint unavailable, falling back: {}", err)
            }
        }

        // 2. Aggregate source health.
        match self
            .client
            .get_json::<SourcesHealthResponse>(&self.config.sources_health_url)
            .await
        {
            Ok(sources) => {
                let allowed = sources.healthy_count > 0 || sources.total_sources == 0;
                let blockers = if allowed {
                    Vec::new()
                } else {
                    vec![NO_SOURCES_BLOCKER.to_string()]
                };
                return AuthVerdict {
                    allowed,
                    blockers,
                    message: Some(format!(
                        "{} of {} sources healthy",
                        sources.healthy_count, sources.total_sources
                    )),
                };
            }
            Err(err) => {
                log::debug!("Sources health endpoint unavailable, falling back: {}", err)
            }
        }

        // 3. Bare liveness probe.
        match self.client.get_ok(&self.config.health_url).await {
            Ok(()) => AuthVerdict {
                allowed: true,
                blockers: Vec::new(),
                message: Some("Backend reachable".to_string()),
            },
            Err(err) => AuthVerdict {
                allowed: false,
                blockers: vec![UNREACHABLE_BLOCKER.to_string()],
                message: Some(err.user_message()),
            },
        }
    }

    /// Cancels the in-flight check token and installs a fresh one.
    fn supersede(&self) -> CancellationToken {
        let mut slot = self
            .inflight
            .lock()
            .expect("authorization checker token lock poisoned");
        slot.cancel();
        *slot = self.shutdown.child_token();
        slot.clone()
    }
}
