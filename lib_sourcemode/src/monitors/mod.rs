//! # Background Monitors Module
//!
//! The two timer-driven loops that keep the mode record honest. Both follow
//! the same superseding-cancellation discipline: before a new probe is
//! issued, the token of any probe still in flight is cancelled, so results
//! are applied strictly in issue order and a superseded result is a no-op.
//! Component teardown cancels everything outstanding through the manager's
//! root shutdown token.
//!
//! ## Contained Modules:
//! - **`connection`**: the liveness poll that runs while in Live mode and
//!   tracks consecutive failures.
//! - **`authorization`**: the coarser poll asking the backend whether Live
//!   mode is permitted at all, regardless of the current mode.

/// Periodic liveness probing of the backend health endpoint.
pub mod connection;
/// Backend-authoritative Live authorization polling with fallback cascade.
pub mod authorization;

// --- Public API Re-exports ---
pub use authorization::LiveAuthChecker;
pub use connection::ConnectionMonitor;
