//! Remote store backed by the system OpenSSH `scp` binary.
//!
//! Each `put` drives one batch-mode `scp` invocation; stderr from a
//! failed transfer is classified into authentication, connection and
//! upload errors.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ServerInfo;

use super::traits::{RemoteSession, RemoteStore};
use super::RemoteError;

/// Remote file store using `scp` with a pre-resolved identity file.
pub struct OpenSshStore {
    server: ServerInfo,
    binary: String,
}

impl OpenSshStore {
    pub fn new(server: ServerInfo) -> Self {
        Self {
            server,
            binary: "scp".to_string(),
        }
    }

    /// Override the transfer binary (used by tests).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl RemoteStore for OpenSshStore {
    fn name(&self) -> &str {
        "openssh"
    }

    async fn connect(&self) -> Result<Box<dyn RemoteSession>, RemoteError> {
        // Credentials are pre-resolved; the only thing worth failing
        // fast on before the first transfer is a missing identity file.
        match fs::try_exists(&self.server.key_path).await {
            Ok(true) => {}
            _ => {
                return Err(RemoteError::KeyNotFound {
                    path: self.server.key_path.clone(),
                })
            }
        }

        info!(
            "Opening transfer session to {}@{}:{}",
            self.server.username, self.server.host, self.server.port
        );
        Ok(Box::new(OpenSshSession {
            server: self.server.clone(),
            binary: self.binary.clone(),
        }))
    }
}

struct OpenSshSession {
    server: ServerInfo,
    binary: String,
}

impl OpenSshSession {
    fn classify(&self, local: &Path, remote: &str, stderr: String) -> RemoteError {
        let lowered = stderr.to_lowercase();
        if lowered.contains("permission denied") || lowered.contains("authentication") {
            RemoteError::Auth {
                host: self.server.host.clone(),
                detail: stderr,
            }
        } else if lowered.contains("connection refused")
            || lowered.contains("connection timed out")
            || lowered.contains("could not resolve")
            || lowered.contains("no route to host")
        {
            RemoteError::Connect {
                host: self.server.host.clone(),
                detail: stderr,
            }
        } else {
            RemoteError::Upload {
                local: local.to_path_buf(),
                remote: remote.to_string(),
                detail: stderr,
            }
        }
    }
}

#[async_trait]
impl RemoteSession for OpenSshSession {
    async fn put(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let target = format!(
            "{}@{}:{}",
            self.server.username, self.server.host, remote
        );
        debug!("scp {} -> {}", local.display(), target);

        let output = Command::new(&self.binary)
            .arg("-B")
            .arg("-P")
            .arg(self.server.port.to_string())
            .arg("-i")
            .arg(&self.server.key_path)
            .arg(local)
            .arg(&target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(RemoteError::Spawn)?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(self.classify(local, remote, stderr))
        }
    }

    async fn close(&mut self) -> Result<(), RemoteError> {
        // No persistent connection to tear down; each put is its own
        // process. Kept for the session contract.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn server() -> ServerInfo {
        ServerInfo {
            host: "files.example.com".to_string(),
            port: 22,
            username: "feeds".to_string(),
            key_path: PathBuf::from("/nonexistent/id_ed25519"),
        }
    }

    #[tokio::test]
    async fn test_connect_fails_on_missing_key() {
        let store = OpenSshStore::new(server());
        assert!(matches!(
            store.connect().await,
            Err(RemoteError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_stderr_classification() {
        let session = OpenSshSession {
            server: server(),
            binary: "scp".to_string(),
        };
        let local = PathBuf::from("/tmp/a.dat");

        assert!(matches!(
            session.classify(&local, "/in/a.dat", "Permission denied (publickey).".into()),
            RemoteError::Auth { .. }
        ));
        assert!(matches!(
            session.classify(&local, "/in/a.dat", "ssh: connect: Connection refused".into()),
            RemoteError::Connect { .. }
        ));
        assert!(matches!(
            session.classify(&local, "/in/a.dat", "scp: /in/a.dat: No space left".into()),
            RemoteError::Upload { .. }
        ));
    }
}
