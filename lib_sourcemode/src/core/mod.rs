//! # Core Controller Module
//!
//! The heart of the mode controller. It aggregates the components that own
//! and mutate the shared mode record, announce changes to the rest of the
//! process, and orchestrate the animated switch between data universes.
//!
//! ## Core Components:
//!
//! - **`state`**: The single mutable `ModeState` record, its enums, the
//!   derived booleans the data-fetching collaborators read, and the
//!   `ModeStore` that serializes every mutation.
//!
//! - **`broadcast`**: A typed publish/subscribe channel carrying the two
//!   process-wide notifications (`ModeChanged`, `RefreshRequested`). Late
//!   subscribers do not receive past events.
//!
//! - **`transition`**: The coordinator for a mode switch: authorization
//!   gating, the deterministic progress animation, the atomic commit, and the
//!   post-switch side effects.
//!
//! - **`source_manager`**: The assembly point. It wires the store, event bus,
//!   persistence, probe client, and monitors together and exposes the public
//!   API the dashboard consumes.

/// The mode record, its enums, derived booleans, and the owning store.
pub mod state;
/// Typed process-wide publish/subscribe channel.
pub mod broadcast;
/// Orchestrates the animated, guarded switch between modes.
pub mod transition;
/// Wires all components together and manages their lifecycle.
pub mod source_manager;

// --- Public API Re-exports ---
pub use broadcast::{EventBus, SourceEvent};
pub use source_manager::SourceModeManager;
pub use state::{ConnectionStatus, DataMode, ModeState, ModeStore};
pub use transition::TransitionCoordinator;
