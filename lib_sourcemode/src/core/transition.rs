//! # Transition Coordinator
//!
//! Orchestrates a mode switch: validates the request against the current
//! authorization state, runs a deterministic animated progress sequence,
//! commits the new mode atomically, persists it, announces it, and triggers
//! the post-switch connection attempt.
//!
//! ## Failure semantics:
//! - Switching **to Demo is never blocked**; Demo is always reachable
//!   regardless of backend state.
//! - Switching **to Live is conditionally blocked** by the last backend
//!   authorization verdict. A rejected switch is a state update (the first
//!   blocker lands in `error_message`) plus a background re-check, never an
//!   error returned to the caller.
//! - Transitions are non-reentrant: a second request arriving while one is
//!   in flight is rejected. A started transition always runs to completion;
//!   the sequence is short and the guard makes rapid double-toggles harmless.

use std::sync::Arc;

use crate::config::SourceModeConfig;
use crate::core::broadcast::{EventBus, SourceEvent};
use crate::core::state::{ConnectionStatus, DataMode, ModeStore};
use crate::monitors::authorization::{LiveAuthChecker, DEFAULT_BLOCKER};
use crate::monitors::connection::ConnectionMonitor;
use crate::persist::mode_file::ModeFile;
use crate::retrieve::probe_http::ProbeClient;

/// Outcome of the atomic begin step of `set_mode`.
enum Begin {
    /// Request accepted; the transition sequence owns the record now.
    Accepted,
    /// Target equals the current mode; nothing to do.
    AlreadyCurrent,
    /// Another transition is running; request rejected.
    InFlight,
    /// Target was Live but the backend has not allowed it.
    LiveBlocked,
}

/// Runs the guarded, animated switch between the two data universes.
pub struct TransitionCoordinator {
    config: Arc<SourceModeConfig>,
    store: Arc<ModeStore>,
    bus: EventBus,
    persistence: Arc<ModeFile>,
    client: Arc<ProbeClient>,
    connection: Arc<ConnectionMonitor>,
    authorization: Arc<LiveAuthChecker>,
}

impl TransitionCoordinator {
    /// Wires the coordinator to the components it drives.
    pub fn new(
        config: Arc<SourceModeConfig>,
        store: Arc<ModeStore>,
        bus: EventBus,
        persistence: Arc<ModeFile>,
        client: Arc<ProbeClient>,
        connection: Arc<ConnectionMonitor>,
        authorization: Arc<LiveAuthChecker>,
    ) -> Self {
        Self {
            config,
            store,
            bus,
            persistence,
            client,
            connection,
            authorization,
        }
    }

    /// Switches to the opposite of the current mode.
    pub async fn toggle_mode(&self) {
        let target = self.store.snapshot().await.mode.opposite();
        self.set_mode(target).await;
    }

    /// Requests a switch to `target`.
    ///
    /// All expected failure modes resolve into the mode record rather than a
    /// return value: callers observe outcomes through `error_message`,
    /// `live_blockers`, and `connection_status`.
    pub async fn set_mode(&self, target: DataMode) {
        // The begin step is one atomic check-and-set: same-mode no-op,
        // reentrancy guard, and authorization gate all under a single lock.
        let begin = self
            .store
            .update(|state| {
                if state.mode == target {
                    return Begin::AlreadyCurrent;
                }
                if state.is_transitioning {
                    return Begin::InFlight;
                }
                if target == DataMode::Live && !state.live_allowed {
                    let blocker = state
                        .live_blockers
                        .first()
                        .cloned()
                        .unwrap_or_else(|| DEFAULT_BLOCKER.to_string());
                    state.error_message = Some(blocker);
                    return Begin::LiveBlocked;
                }
                state.is_transitioning = true;
                state.transition_progress = 0;
                state.error_message = None;
                Begin::Accepted
            })
            .await;

        match begin {
            Begin::AlreadyCurrent => return,
            Begin::InFlight => {
                log::warn!(
                    "Mode change to {:?} rejected: a transition is already running",
                    target
                );
                return;
            }
            Begin::LiveBlocked => {
                // Re-check in the background so the caller can retry
                // immediately once the backend relents.
                log::info!("Switch to Live blocked by backend; scheduling a re-check");
                let authorization = Arc::clone(&self.authorization);
                tokio::spawn(async move { authorization.check_now().await });
                return;
            }
            Begin::Accepted => {}
        }

        self.animate().await;
        self.commit(target).await;
    }

    /// Fixed deterministic progress ramp: equal increments separated by a
    /// short fixed delay, terminating at exactly 100 while the transition
    /// flag is still set.
    async fn animate(&self) {
        let steps = self.config.transition_steps.max(1);
        for step in 1..=steps {
            tokio::time::sleep(self.config.transition_step_delay).await;
            let progress = ((step * 100) / steps).min(100) as u8;
            self.store
                .update(|state| state.transition_progress = progress)
                .await;
        }
    }

    /// Applies the new mode in one atomic update, then runs the post-commit
    /// side effects (persist, broadcast, immediate Live probe).
    async fn commit(&self, target: DataMode) {
        self.store
            .update(|state| {
                state.mode = target;
                state.is_transitioning = false;
                // Held at 100 until the next transition resets it.
                state.transition_progress = 100;
                state.connection_status = match target {
                    DataMode::Demo => ConnectionStatus::Disconnected,
                    DataMode::Live => ConnectionStatus::Connecting,
                };
                state.error_message = None;
                state.failure_count = 0;
            })
            .await;

        // Best-effort persistence: a storage failure must never undo the switch.
        self.persistence.store(target);
        self.bus.emit(SourceEvent::ModeChanged(target));
        log::info!("Data source switched to {:?}", target);

        if target == DataMode::Live {
            // Probe immediately so the UI is not stuck on Connecting until
            // the next periodic tick.
            self.connection.probe_once().await;

            let connected =
                self.store.snapshot().await.connection_status == ConnectionStatus::Connected;
            if connected {
                self.populate_live_data();
            }
        }
    }

    /// One-shot, fire-and-forget request asking the backend to start
    /// populating Live data. Failures are logged, never surfaced as
    /// transition failures.
    fn populate_live_data(&self) {
        let client = Arc::clone(&self.client);
        let url = self.config.populate_url.clone();
        tokio::spawn(async move {
            if let Err(err) = client.post_ok(&url).await {
                log::warn!("Live data populate request failed: {}", err);
            }
        });
    }
}
