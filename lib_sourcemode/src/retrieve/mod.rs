//! # Data Retrieval Module
//!
//! Generic HTTP plumbing for the controller's network probes. Everything the
//! monitors send over the wire goes through one shared, bounded-timeout
//! client so that probe behavior (timeouts, auth, error classification) is
//! uniform across the health and authorization loops.
//!
//! ## Contained Modules:
//!
//! - **`probe_http`**: A thin `reqwest` wrapper issuing single, fail-fast
//!   probe requests. There is deliberately no retry layer here: a failed
//!   probe is retried by the next timer tick, never by the transport.

/// Bounded-timeout probe client and its error taxonomy.
pub mod probe_http;

pub use probe_http::{ProbeClient, ProbeError};
