//! # Persistence Module
//!
//! Failure-tolerant durable storage for the one value this subsystem
//! persists: the selected data-source mode. Storage problems are swallowed
//! in both directions; the controller falls back to Demo on load and keeps
//! running on a failed write.

/// The single-value persisted mode file.
pub mod mode_file;

pub use mode_file::ModeFile;
