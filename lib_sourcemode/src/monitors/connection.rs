//! # Connection Health Monitor
//!
//! Issues a periodic liveness probe against the backend health endpoint while
//! the application is in Live mode, tracking a consecutive-failure count and
//! a classified error message in the shared mode record.
//!
//! ## Key Design Principles:
//! - **Live-only**: health checks do not run in Demo mode; the connection
//!   status simply rests at `Disconnected` there.
//! - **Superseding cancellation**: before a new probe is issued, any probe
//!   still in flight is cancelled. Only the most recently issued probe's
//!   result is ever applied; a cancelled probe's late resolution is a no-op.
//! - **No automatic fallback**: probe failures keep the application in Live
//!   mode and surface the error. Only an explicit user action changes mode;
//!   Live must never silently substitute fabricated data.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::SourceModeConfig;
use crate::core::state::{ConnectionStatus, DataMode, ModeStore};
use crate::retrieve::probe_http::ProbeClient;

/// The liveness poll loop and its one-shot probe entry point.
pub struct ConnectionMonitor {
    config: Arc<SourceModeConfig>,
    store: Arc<ModeStore>,
    client: Arc<ProbeClient>,
    shutdown: CancellationToken,
    /// Token of the probe currently in flight. Replaced (and the predecessor
    /// cancelled) every time a new probe is issued.
    inflight: Mutex<CancellationToken>,
}

impl ConnectionMonitor {
    /// Creates the monitor. Probe tokens are children of `shutdown`, so
    /// cancelling it tears down any outstanding probe.
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

    /// Periodic poll loop. Sleeps for the configured interval, probes only
    /// while the store reports Live, and exits on shutdown.
    ///
    /// When the process wakes up already in Live mode (persisted selection),
    /// the first probe runs immediately rather than waiting a full interval.
    pub async fn run(&self) {
        log::info!(
            "Connection monitor started (interval {}s)",
            self.config.health_interval.as_secs()
        );
        if self.store.snapshot().await.mode == DataMode::Live {
            self.probe_once().await;
        }
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    log::debug!("Connection monitor stopped");
                    break;
                }
                _ = tokio::time::sleep(self.config.health_interval) => {}
            }

            if self.store.snapshot().await.mode == DataMode::Live {
                self.probe_once().await;
            }
        }
    }

    /// Issues one liveness probe, superseding any probe still in flight.
    ///
    /// Also called out-of-band by the transition coordinator right after a
    /// switch to Live, so the UI does not wait for the next periodic tick.
    pub async fn probe_once(&self) {
        let token = self.supersede();

        let outcome = tokio::select! {
            // Cancelled mid-flight: superseded or shutting down. Swallow.
            _ = token.cancelled() => return,
            result = self.client.get_ok(&self.config.health_url) => result,
        };

        self.store
            .update(|state| {
                // The cancellation check runs inside the locked update so a
                // result superseded after the select resolved still cannot
                // overwrite a newer probe's write.
                if token.is_cancelled() {
                    return;
                }
                match &outcome {
                    Ok(()) => {
                        state.connection_status = ConnectionStatus::Connected;
                        state.last_sync_time = Some(Utc::now());
                        state.error_message = None;
                        state.failure_count = 0;
                    }
                    Err(err) => {
                        state.connection_status = ConnectionStatus::Error;
                        state.failure_count += 1;
                        state.error_message = Some(err.user_message());
                        log::warn!(
                            "Health probe failed (consecutive failures: {}): {}",
                            state.failure_count,
                            err
                        );
                    }
                }
            })
            .await;
    }

    /// Cancels the in-flight probe token and installs a fresh one.
    fn supersede(&self) -> CancellationToken {
        let mut slot = self
            .inflight
            .lock()
            .expect("connection monitor token lock poisoned");
        slot.cancel();
        *slot = self.shutdown.child_token();
        slot.clone()
    }
}
