//! Trait definitions for the remote file store.

use std::path::Path;

use async_trait::async_trait;

use super::RemoteError;

/// A remote file store that dispatch runs can open sessions against.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Open a session. Connect and authentication failures are fatal
    /// for the dispatch run that requested the session.
    async fn connect(&self) -> Result<Box<dyn RemoteSession>, RemoteError>;
}

/// An open session against a remote file store.
///
/// Callers must `close` the session on every exit path, success or
/// failure.
#[async_trait]
pub trait RemoteSession: Send {
    /// Upload one local file to the given remote path.
    async fn put(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError>;

    /// Release the session.
    async fn close(&mut self) -> Result<(), RemoteError>;
}
