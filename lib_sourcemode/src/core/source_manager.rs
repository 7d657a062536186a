//! # Source Mode Manager
//!
//! The central coordinator for the data-source controller. It assembles the
//! store, event bus, persistence adapter, probe client, monitors, and
//! transition coordinator around shared handles, spawns the background poll
//! loops, and exposes the public surface the dashboard consumes.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::SourceModeConfig;
use crate::core::broadcast::{EventBus, SourceEvent};
use crate::core::state::{DataMode, ModeState, ModeStore};
use crate::core::transition::TransitionCoordinator;
use crate::monitors::authorization::LiveAuthChecker;
use crate::monitors::connection::ConnectionMonitor;
use crate::persist::mode_file::ModeFile;
use crate::retrieve::probe_http::ProbeClient;

/// Owner of the whole mode-controller subsystem.
///
/// There is no command-line surface; everything is driven through this API:
/// [`snapshot`](Self::snapshot), [`subscribe`](Self::subscribe),
/// [`set_mode`](Self::set_mode) / [`toggle_mode`](Self::toggle_mode), and
/// [`shutdown`](Self::shutdown).
pub struct SourceModeManager {
    store: Arc<ModeStore>,
    bus: EventBus,
    coordinator: TransitionCoordinator,
    connection: Arc<ConnectionMonitor>,
    authorization: Arc<LiveAuthChecker>,
    shutdown: CancellationToken,
}

impl SourceModeManager {
    /// Builds the subsystem. The initial mode is seeded from the persistence
    /// adapter (defaulting to Demo on any storage problem); nothing runs in
    /// the background until [`spawn_monitors`](Self::spawn_monitors).
    ///
    /// # Errors
    /// Returns an error only for construction-time problems (an HTTP client
    /// that cannot be built). Runtime failures land in the mode record.
    pub fn new(config: SourceModeConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let client = Arc::new(ProbeClient::new(
            config.probe_timeout,
            config.auth_token.clone(),
        )?);
        let persistence = Arc::new(ModeFile::new(config.persist_path.clone()));

        let initial_mode = persistence.load();
        log::info!("Source mode seeded from storage: {:?}", initial_mode);
        let store = Arc::new(ModeStore::new(initial_mode));

        let bus = EventBus::new(config.bus_capacity);
        let shutdown = CancellationToken::new();

        let connection = Arc::new(ConnectionMonitor::new(
            Arc::clone(&config),
            Arc::clone(&store),
            Arc::clone(&client),
            shutdown.clone(),
        ));
        let authorization = Arc::new(LiveAuthChecker::new(
            Arc::clone(&config),
            Arc::clone(&store),
            Arc::clone(&client),
            shutdown.clone(),
        ));
        let coordinator = TransitionCoordinator::new(
            config,
            Arc::clone(&store),
            bus.clone(),
            persistence,
            client,
            Arc::clone(&connection),
            Arc::clone(&authorization),
        );

        Ok(Self {
            store,
            bus,
            coordinator,
            connection,
            authorization,
            shutdown,
        })
    }

    /// Spawns the two background poll loops: the connection health monitor
    /// and the Live authorization checker. The authorization loop issues its
    /// first check immediately.
    pub fn spawn_monitors(&self) {
        let connection = Arc::clone(&self.connection);
        tokio::spawn(async move { connection.run().await });

        let authorization = Arc::clone(&self.authorization);
        tokio::spawn(async move { authorization.run().await });
    }

    /// A consistent copy of the current mode record.
    pub async fn snapshot(&self) -> ModeState {
        self.store.snapshot().await
    }

    /// Subscribes to mode-controller events. Late subscribers do not receive
    /// past events.
    pub fn subscribe(&self) -> broadcast::Receiver<SourceEvent> {
        self.bus.subscribe()
    }

    /// Requests a switch to `target`. See [`TransitionCoordinator::set_mode`]
    /// for the gating and failure semantics.
    pub async fn set_mode(&self, target: DataMode) {
        self.coordinator.set_mode(target).await;
    }

    /// Switches to the opposite of the current mode.
    pub async fn toggle_mode(&self) {
        self.coordinator.toggle_mode().await;
    }

    /// Runs one authorization check right now and waits for its verdict to
    /// be committed. Backs a UI "retry" affordance.
    pub async fn check_live_status_now(&self) {
        self.authorization.check_now().await;
    }

    /// Issues one connection health probe right now, superseding any probe
    /// in flight.
    pub async fn probe_connection_now(&self) {
        self.connection.probe_once().await;
    }

    /// Asks data-fetching subscribers to re-fetch without a mode change.
    pub fn request_refresh(&self) {
        self.bus.emit(SourceEvent::RefreshRequested);
    }

    /// Cancels the poll loops and every outstanding probe token.
    pub fn shutdown(&self) {
        log::info!("Source mode manager shutting down");
        self.shutdown.cancel();
    }
}

impl Drop for SourceModeManager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
