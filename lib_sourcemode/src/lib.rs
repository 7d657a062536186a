//! # SigDeck Source-Mode Library
//!
//! `lib_sourcemode` decides, at any moment, whether the SigDeck dashboard
//! consumes real backend data ("Live") or locally simulated demonstration data
//! ("Demo"), and guarantees those two data universes are never mixed. It owns
//! the asynchronous backend-authorization checks, the periodic connection
//! health polling with cancellation, the animated but deterministic mode
//! transition, and the backend-authoritative gating of which mode is even
//! reachable.
//!
//! The dashboard's data-fetching collaborators consume this crate through
//! [`SourceModeManager`]: read a [`ModeState`] snapshot, derive
//! `can_use_live_data` / `should_use_mock_data`, subscribe to [`SourceEvent`]
//! notifications, and request mode switches. Everything else in here is
//! plumbing for those four operations.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

// Declare the modules to re-export
pub mod config;
pub mod core;
pub mod monitors;
pub mod persist;
pub mod retrieve;

// --- Public API Re-exports ---
// Make the primary types directly accessible at the crate root.
pub use crate::config::SourceModeConfig;
pub use crate::core::broadcast::{EventBus, SourceEvent};
pub use crate::core::source_manager::SourceModeManager;
pub use crate::core::state::{ConnectionStatus, DataMode, ModeState, ModeStore};
pub use crate::core::transition::TransitionCoordinator;
pub use crate::monitors::{ConnectionMonitor, LiveAuthChecker};
pub use crate::persist::mode_file::ModeFile;
pub use crate::retrieve::probe_http::{ProbeClient, ProbeError};
