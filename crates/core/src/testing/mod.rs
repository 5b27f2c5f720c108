//! Testing utilities and mock implementations.
//!
//! Provides a mock remote file store so dispatch runs can be exercised
//! end to end without real infrastructure.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::remote::{RemoteError, RemoteSession, RemoteStore};

/// Recording remote store with injectable connect and upload failures.
#[derive(Clone, Default)]
pub struct MockRemoteStore {
    puts: Arc<Mutex<Vec<(PathBuf, String)>>>,
    fail_connect: Arc<AtomicBool>,
    failing_files: Arc<Mutex<HashSet<String>>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `connect` calls fail.
    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make every `put` of a file with this name fail.
    pub fn fail_put(&self, file_name: impl Into<String>) {
        self.failing_files.lock().unwrap().insert(file_name.into());
    }

    /// Recorded (local, remote) upload pairs.
    pub fn puts(&self) -> Vec<(PathBuf, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<Box<dyn RemoteSession>, RemoteError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(RemoteError::Connect {
                host: "mock".to_string(),
                detail: "injected connect failure".to_string(),
            });
        }
        Ok(Box::new(MockRemoteSession {
            store: self.clone(),
        }))
    }
}

struct MockRemoteSession {
    store: MockRemoteStore,
}

#[async_trait]
impl RemoteSession for MockRemoteSession {
    async fn put(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let name = local
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if self.store.failing_files.lock().unwrap().contains(&name) {
            return Err(RemoteError::Upload {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                detail: "injected upload failure".to_string(),
            });
        }
        self.store
            .puts
            .lock()
            .unwrap()
            .push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        Ok(())
    }
}
