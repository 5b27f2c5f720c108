//! Remote file store interface.
//!
//! The raw bytes-over-the-wire transport is an external collaborator:
//! the dispatcher only needs a session that can `put` a local file to a
//! remote path and that is released on every exit path of a run.

mod openssh;
mod traits;

pub use openssh::OpenSshStore;
pub use traits::{RemoteSession, RemoteStore};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the remote file store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Authentication to the remote host was rejected.
    #[error("authentication to {host} failed: {detail}")]
    Auth { host: String, detail: String },

    /// The remote host could not be reached.
    #[error("failed to connect to {host}: {detail}")]
    Connect { host: String, detail: String },

    /// The configured identity file does not exist.
    #[error("identity file not found: {path}")]
    KeyNotFound { path: PathBuf },

    /// The transfer process could not be started.
    #[error("failed to spawn transfer process")]
    Spawn(#[source] std::io::Error),

    /// An individual upload failed. Recoverable: the dispatcher skips
    /// the file and continues.
    #[error("failed to upload {local} to {remote}: {detail}")]
    Upload {
        local: PathBuf,
        remote: String,
        detail: String,
    },
}
