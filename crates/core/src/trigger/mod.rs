//! Trigger-gated discovery of (data, sentinel) file pairs.
//!
//! A producer signals that a data file is complete by writing a
//! companion sentinel ("trigger") file next to it. [`TriggerGate`]
//! discovers complete pairs in a source directory and deletes the
//! sentinel once a pair has been handed off.

mod gate;
mod types;

pub use gate::TriggerGate;
pub use types::FilePair;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by trigger-gated discovery and consumption.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The source directory could not be listed. Fatal for the current
    /// pass, recoverable on the next invocation.
    #[error("failed to list source directory {path}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A consumed sentinel could not be deleted. Non-fatal, but the
    /// pair will be reprocessed on the next run until the sentinel is
    /// cleaned up.
    #[error("failed to delete sentinel {path}")]
    Sentinel {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
