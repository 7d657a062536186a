//! # Mode State Store
//!
//! The single owner of the mutable mode record. Every other component reads
//! it through cloned snapshots and mutates it only through the named actions
//! of the three writers (the transition coordinator and the two monitors),
//! each of which applies its mutation as one closure under one write-lock
//! acquisition so readers never observe a torn record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Blocker reported before the first authorization check has resolved.
pub const INITIAL_BLOCKER: &str = "Checking backend status...";

/// Which universe the dashboard's data comes from.
///
/// Exactly these two values exist; there is no hybrid state. In Live mode no
/// synthesized values are ever shown, in Demo mode no real backend data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// All displayed data originates from the real backend.
    Live,
    /// All displayed data is synthesized or pre-seeded locally.
    Demo,
}

impl DataMode {
    /// The persisted wire form of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Live => "live",
            DataMode::Demo => "demo",
        }
    }

    /// Parses a persisted value. Anything other than `"live"` or `"demo"`
    /// is `None`, which callers treat as the Demo default.
    pub fn parse(raw: &str) -> Option<DataMode> {
        match raw.trim() {
            "live" => Some(DataMode::Live),
            "demo" => Some(DataMode::Demo),
            _ => None,
        }
    }

    /// The other mode, used by toggle semantics.
    pub fn opposite(&self) -> DataMode {
        match self {
            DataMode::Live => DataMode::Demo,
            DataMode::Demo => DataMode::Live,
        }
    }
}

/// Health of the backend connection as seen by the health monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// The last liveness probe succeeded.
    Connected,
    /// A connection attempt is underway (the resting value right after a
    /// switch to Live, before the first probe resolves).
    Connecting,
    /// No connection is maintained. The resting value in Demo mode, where
    /// health checks do not run.
    Disconnected,
    /// The last liveness probe failed.
    Error,
}

/// The single mutable mode record.
///
/// Constructed once at process start (mode seeded from the persistence
/// adapter, everything else at cold-start defaults) and mutated exclusively
/// through [`ModeStore`]. `is_transitioning` and `transition_progress` are
/// intentionally observable mid-flight so the UI can animate a switch.
#[derive(Debug, Clone, Serialize)]
pub struct ModeState {
    /// The current data universe.
    pub mode: DataMode,
    /// True only while a transition's animated sequence is running.
    pub is_transitioning: bool,
    /// 0–100, monotonically non-decreasing within one transition and held at
    /// 100 after completion until the next transition starts.
    pub transition_progress: u8,
    /// Backend connection health. Meaningful in Live mode; `Disconnected`
    /// rests in Demo mode.
    pub connection_status: ConnectionStatus,
    /// Timestamp of the last successful liveness probe.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Human-readable cause of the most recent failure, cleared on success.
    pub error_message: Option<String>,
    /// Consecutive liveness-probe failures, reset to 0 on any success.
    pub failure_count: u32,
    /// Last backend verdict on whether Live mode is permitted at all.
    pub live_allowed: bool,
    /// Ordered reasons Live is blocked; empty exactly when `live_allowed`.
    pub live_blockers: Vec<String>,
    /// Timestamp of the last completed authorization check.
    pub live_status_checked_at: Option<DateTime<Utc>>,
    /// Backend-supplied (or cascade-synthesized) detail for the verdict.
    pub live_status_message: Option<String>,
}

impl ModeState {
    /// Cold-start record for the given seeded mode.
    ///
    /// A Live-seeded record starts at `Connecting`, exactly like the commit
    /// of a switch to Live; `Disconnected` is the Demo resting value only.
    pub fn with_mode(mode: DataMode) -> Self {
        Self {
            mode,
            is_transitioning: false,
            transition_progress: 0,
            connection_status: match mode {
                DataMode::Live => ConnectionStatus::Connecting,
                DataMode::Demo => ConnectionStatus::Disconnected,
            },
            last_sync_time: None,
            error_message: None,
            failure_count: 0,
            live_allowed: false,
            live_blockers: vec![INITIAL_BLOCKER.to_string()],
            live_status_checked_at: None,
            live_status_message: None,
        }
    }

    /// True when displayed data may come from the real backend: Live mode
    /// with a healthy connection.
    pub fn can_use_live_data(&self) -> bool {
        self.mode == DataMode::Live && self.connection_status == ConnectionStatus::Connected
    }

    /// True exactly in Demo mode. Never true in Live, even under failure:
    /// Live must surface its error rather than silently substitute
    /// fabricated data.
    pub fn should_use_mock_data(&self) -> bool {
        self.mode == DataMode::Demo
    }

    /// True when the UI must present the stored error: Live mode with a
    /// connection that is neither healthy nor mid-attempt.
    pub fn should_show_error(&self) -> bool {
        self.mode == DataMode::Live
            && !matches!(
                self.connection_status,
                ConnectionStatus::Connected | ConnectionStatus::Connecting
            )
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::with_mode(DataMode::Demo)
    }
}

/// Thread-safe owner of the one [`ModeState`] record.
///
/// Readers take cloned snapshots; writers inside this crate apply named
/// mutations through [`ModeStore::update`], which runs the whole mutation
/// under a single write-lock acquisition.
pub struct ModeStore {
    inner: RwLock<ModeState>,
}

impl ModeStore {
    /// Creates the store with the seeded initial mode.
    pub fn new(initial_mode: DataMode) -> Self {
        Self {
            inner: RwLock::new(ModeState::with_mode(initial_mode)),
        }
    }

    /// A fully-formed, internally consistent copy of the current record.
    pub async fn snapshot(&self) -> ModeState {
        self.inner.read().await.clone()
    }

    /// Applies one atomic mutation and returns its result.
    ///
    /// Crate-private: only the transition coordinator and the two monitors
    /// hold write paths into the record.
    pub(crate) async fn update<F, R>(&self, apply: F) -> R
    where
        F: FnOnce(&mut ModeState) -> R,
    {
        let mut state = self.inner.write().await;
        apply(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_defaults() {
        let state = ModeState::default();
        assert_eq!(state.mode, DataMode::Demo);
        assert!(!state.is_transitioning);
        assert_eq!(state.transition_progress, 0);
        assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
        assert!(!state.live_allowed);
        assert_eq!(state.live_blockers, vec![INITIAL_BLOCKER.to_string()]);
        assert!(state.live_status_checked_at.is_none());
    }

    #[test]
    fn live_seeded_record_starts_connecting_not_disconnected() {
        let state = ModeState::with_mode(DataMode::Live);
        assert_eq!(state.connection_status, ConnectionStatus::Connecting);
        // Connecting is not an error surface: no message-less error window.
        assert!(!state.should_show_error());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn mode_parse_accepts_only_the_two_wire_values() {
        assert_eq!(DataMode::parse("live"), Some(DataMode::Live));
        assert_eq!(DataMode::parse("demo"), Some(DataMode::Demo));
        assert_eq!(DataMode::parse("  live\n"), Some(DataMode::Live));
        assert_eq!(DataMode::parse("hybrid"), None);
        assert_eq!(DataMode::parse(""), None);
        assert_eq!(DataMode::parse("LIVE"), None);
    }

    #[test]
    fn opposite_flips_between_the_two_modes() {
        assert_eq!(DataMode::Live.opposite(), DataMode::Demo);
        assert_eq!(DataMode::Demo.opposite(), DataMode::Live);
    }

    #[test]
    fn derived_booleans_are_consistent() {
        let mut state = ModeState::with_mode(DataMode::Demo);
        assert!(state.should_use_mock_data());
        assert!(!state.can_use_live_data());
        assert!(!state.should_show_error());

        state.mode = DataMode::Live;
        state.connection_status = ConnectionStatus::Connecting;
        assert!(!state.should_use_mock_data());
        assert!(!state.can_use_live_data());
        assert!(!state.should_show_error());

        state.connection_status = ConnectionStatus::Connected;
        assert!(state.can_use_live_data());
        assert!(!state.should_show_error());

        // Live under failure keeps surfacing the error, never mock data.
        state.connection_status = ConnectionStatus::Error;
        assert!(!state.can_use_live_data());
        assert!(!state.should_use_mock_data());
        assert!(state.should_show_error());
    }

    #[tokio::test]
    async fn update_is_applied_atomically_and_visible_in_snapshots() {
        let store = ModeStore::new(DataMode::Demo);
        store
            .update(|state| {
                state.connection_status = ConnectionStatus::Error;
                state.failure_count += 1;
                state.error_message = Some("boom".to_string());
            })
            .await;

        let snap = store.snapshot().await;
        assert_eq!(snap.connection_status, ConnectionStatus::Error);
        assert_eq!(snap.failure_count, 1);
        assert_eq!(snap.error_message.as_deref(), Some("boom"));
    }
}
