//! Remote dispatch: upload to an external server over a scoped session.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::remote::RemoteStore;
use crate::trigger::TriggerGate;

use super::traits::Dispatcher;
use super::types::RunSummary;
use super::DispatchError;

/// Uploads each ready pair's data file to a remote directory and
/// consumes the sentinel after a successful upload. Connect failures
/// abort the entry; per-file upload failures skip and continue.
pub struct RemoteDispatcher {
    gate: TriggerGate,
    store: Arc<dyn RemoteStore>,
    remote_directory: String,
}

impl RemoteDispatcher {
    pub fn new(
        gate: TriggerGate,
        store: Arc<dyn RemoteStore>,
        remote_directory: impl Into<String>,
    ) -> Self {
        Self {
            gate,
            store,
            remote_directory: remote_directory.into(),
        }
    }

    fn remote_path(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.remote_directory.trim_end_matches('/'),
            file_name
        )
    }
}

#[async_trait]
impl Dispatcher for RemoteDispatcher {
    fn name(&self) -> &str {
        "external_server"
    }

    async fn run(&self) -> Result<RunSummary, DispatchError> {
        let pairs = self.gate.discover_ready_pairs().await?;

        let mut summary = RunSummary {
            discovered: pairs.len(),
            ..RunSummary::default()
        };
        if pairs.is_empty() {
            return Ok(summary);
        }

        let mut session = self.store.connect().await?;

        for pair in &pairs {
            let remote_path = self.remote_path(pair.file_name());
            match session.put(&pair.data_path, &remote_path).await {
                Ok(()) => {
                    info!(
                        "Transferred {} to {} at {}",
                        pair.file_name(),
                        self.store.name(),
                        remote_path
                    );
                    summary.delivered += 1;
                    match self.gate.consume(pair).await {
                        Ok(()) => summary.consumed += 1,
                        Err(e) => warn!("{}", e),
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to transfer {} to {}: {}",
                        pair.file_name(),
                        remote_path,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        if let Err(e) = session.close().await {
            warn!("Failed to close remote session: {}", e);
        }

        info!(
            "Pass over {} done: {} discovered, {} delivered, {} consumed, {} failed",
            self.gate.source_dir().display(),
            summary.discovered,
            summary.delivered,
            summary.consumed,
            summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemoteStore;
    use tempfile::TempDir;
    use tokio::fs;

    async fn seed_pair(dir: &std::path::Path, stem: &str) {
        fs::write(dir.join(format!("{stem}.dat")), b"data")
            .await
            .unwrap();
        fs::write(dir.join(format!("{stem}.trg")), b"").await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_then_consume() {
        let src = TempDir::new().unwrap();
        seed_pair(src.path(), "RPT01").await;

        let store = MockRemoteStore::new();
        let dispatcher = RemoteDispatcher::new(
            TriggerGate::new(src.path(), ".dat", ".trg"),
            Arc::new(store.clone()),
            "/incoming/",
        );

        let summary = dispatcher.run().await.unwrap();
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.consumed, 1);

        let puts = store.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].1, "/incoming/RPT01.dat");
        assert!(!src.path().join("RPT01.trg").exists());
        assert!(src.path().join("RPT01.dat").exists());
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_sentinel() {
        let src = TempDir::new().unwrap();
        seed_pair(src.path(), "RPT01").await;
        seed_pair(src.path(), "RPT02").await;

        let store = MockRemoteStore::new();
        store.fail_put("RPT01.dat");

        let dispatcher = RemoteDispatcher::new(
            TriggerGate::new(src.path(), ".dat", ".trg"),
            Arc::new(store.clone()),
            "/incoming",
        );

        let summary = dispatcher.run().await.unwrap();
        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.failed, 1);

        assert!(src.path().join("RPT01.trg").exists());
        assert!(!src.path().join("RPT02.trg").exists());
    }

    #[tokio::test]
    async fn test_connect_failure_is_fatal_for_entry() {
        let src = TempDir::new().unwrap();
        seed_pair(src.path(), "RPT01").await;

        let store = MockRemoteStore::new();
        store.fail_connect(true);

        let dispatcher = RemoteDispatcher::new(
            TriggerGate::new(src.path(), ".dat", ".trg"),
            Arc::new(store),
            "/incoming",
        );

        assert!(matches!(
            dispatcher.run().await,
            Err(DispatchError::Remote(_))
        ));
        // Nothing consumed.
        assert!(src.path().join("RPT01.trg").exists());
    }

    #[tokio::test]
    async fn test_empty_source_skips_connect() {
        let src = TempDir::new().unwrap();

        let store = MockRemoteStore::new();
        store.fail_connect(true); // would fail if reached

        let dispatcher = RemoteDispatcher::new(
            TriggerGate::new(src.path(), ".dat", ".trg"),
            Arc::new(store),
            "/incoming",
        );

        let summary = dispatcher.run().await.unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
