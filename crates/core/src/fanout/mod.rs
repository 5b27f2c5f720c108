//! Fan-out of one file pair to N destinations.
//!
//! Destinations are independent: one failing never prevents the others
//! from being attempted. The caller decides sentinel consumption from
//! the aggregate outcomes.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::error;

use crate::sequence::DirLocks;
use crate::transform::{TransformError, TransformPolicy};
use crate::trigger::FilePair;

/// One configured destination with its compiled transform policy.
/// Read-only during a dispatch run.
#[derive(Debug, Clone)]
pub struct Destination {
    pub dir: PathBuf,
    pub policy: TransformPolicy,
}

impl Destination {
    pub fn new(dir: impl Into<PathBuf>, policy: TransformPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }
}

/// Per-destination delivery result for one pair.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub destination: PathBuf,
    pub delivered: bool,
    pub error: Option<TransformError>,
}

impl DispatchOutcome {
    fn delivered(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            delivered: true,
            error: None,
        }
    }

    fn failed(destination: &Path, error: TransformError) -> Self {
        Self {
            destination: destination.to_path_buf(),
            delivered: false,
            error: Some(error),
        }
    }
}

/// Apply each destination's policy to the pair, concurrently, and
/// return one outcome per destination in configuration order.
/// Sequenced renames into the same directory are serialized by `locks`.
pub async fn deliver(
    pair: &FilePair,
    destinations: &[Destination],
    today: NaiveDate,
    locks: &DirLocks,
) -> Vec<DispatchOutcome> {
    let attempts = destinations.iter().map(|destination| async move {
        match destination.policy.apply(pair, &destination.dir, today, locks).await {
            Ok(()) => DispatchOutcome::delivered(&destination.dir),
            Err(e) => {
                error!(
                    "Failed to deliver {} to {}: {}",
                    pair.file_name(),
                    destination.dir.display(),
                    e
                );
                DispatchOutcome::failed(&destination.dir, e)
            }
        }
    });

    join_all(attempts).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn ready_pair(dir: &Path) -> FilePair {
        let data = dir.join("RPT01.dat");
        let trigger = dir.join("RPT01.trg");
        fs::write(&data, b"data").await.unwrap();
        fs::write(&trigger, b"").await.unwrap();
        FilePair::new(data, trigger)
    }

    #[tokio::test]
    async fn test_outcomes_in_destination_order() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let pair = ready_pair(src.path()).await;

        let destinations = vec![
            Destination::new(dst.path().join("a"), TransformPolicy::Identity),
            Destination::new(dst.path().join("b"), TransformPolicy::Identity),
        ];

        let outcomes = deliver(&pair, &destinations, date(2024, 1, 1), &DirLocks::new()).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].destination, dst.path().join("a"));
        assert_eq!(outcomes[1].destination, dst.path().join("b"));
        assert!(outcomes.iter().all(|o| o.delivered));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let pair = ready_pair(src.path()).await;

        // A plain file where a directory is needed makes creation fail.
        let blocked = dst.path().join("blocked");
        fs::write(&blocked, b"not a directory").await.unwrap();

        let destinations = vec![
            Destination::new(&blocked, TransformPolicy::Identity),
            Destination::new(dst.path().join("ok"), TransformPolicy::Identity),
        ];

        let outcomes = deliver(&pair, &destinations, date(2024, 1, 1), &DirLocks::new()).await;
        assert!(!outcomes[0].delivered);
        assert!(outcomes[0].error.is_some());
        assert!(outcomes[1].delivered);
        assert!(dst.path().join("ok/RPT01.dat").exists());
    }
}
