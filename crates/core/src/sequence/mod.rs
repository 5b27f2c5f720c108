//! Scan-then-allocate sequence numbers.
//!
//! Sequence numbers are never persisted: the next number for a
//! destination directory is the maximum found among existing files
//! matching {template prefix, today's date, 5-digit group, remaining
//! template structure}, plus one. Numbers reset at midnight only
//! because the date component of the matching regex changes.
//!
//! Two writers racing on the same directory may both observe the same
//! maximum and allocate a colliding number. Within this process,
//! [`DirLocks`] serializes allocate-and-copy per destination directory;
//! across processes the race is accepted for low-concurrency batch
//! deployments.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use crate::pattern::{FileNamePattern, PatternError};

/// Compute the next unused sequence number for `dest_dir` on `today`.
///
/// Returns `max + 1`, or `1` when no file matches. A destination
/// directory that does not exist or cannot be read also yields `1` with
/// a warning, so one missing destination never blocks the rest of a
/// fan-out. Fails only when the template has no sequence token.
pub async fn next_sequence(
    dest_dir: &Path,
    pattern: &FileNamePattern,
    today: NaiveDate,
) -> Result<u32, PatternError> {
    let regex = pattern.sequence_regex(today)?;

    let mut entries = match fs::read_dir(dest_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "Cannot list destination {} for sequence allocation, starting at 1: {}",
                dest_dir.display(),
                e
            );
            return Ok(1);
        }
    };

    let mut max_seen = 0u32;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(
                    "Error reading destination {} during sequence scan: {}",
                    dest_dir.display(),
                    e
                );
                break;
            }
        };
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(captures) = regex.captures(name) {
            if let Ok(sequence) = captures[1].parse::<u32>() {
                max_seen = max_seen.max(sequence);
            }
        }
    }

    Ok(max_seen + 1)
}

/// In-process advisory locks keyed by destination directory, used to
/// serialize allocate-and-copy when destinations run concurrently.
#[derive(Debug, Clone, Default)]
pub struct DirLocks {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl DirLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one destination directory, creating it on
    /// first use. The guard is held across allocation and copy.
    pub async fn lock_for(&self, dir: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(
                map.entry(dir.to_path_buf())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").await.unwrap();
    }

    #[tokio::test]
    async fn test_monotonicity_over_existing_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "PRE_240101_00001.csv").await;
        touch(temp.path(), "PRE_240101_00002.csv").await;

        let pattern = FileNamePattern::compile("PRE_YYMMDD_<nnnnn>.csv").unwrap();
        let next = next_sequence(temp.path(), &pattern, date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(next, 3);
    }

    #[tokio::test]
    async fn test_previous_day_not_counted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "PRE_240101_00009.csv").await;

        let pattern = FileNamePattern::compile("PRE_YYMMDD_<nnnnn>.csv").unwrap();
        let next = next_sequence(temp.path(), &pattern, date(2024, 1, 2))
            .await
            .unwrap();
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn test_other_prefix_not_counted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "OTHER_240101_00005.csv").await;

        let pattern = FileNamePattern::compile("PRE_YYMMDD_<nnnnn>.csv").unwrap();
        let next = next_sequence(temp.path(), &pattern, date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn test_trailing_structure_respected() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "PRE_240101_00004_02(0930).csv").await;
        // Matches the prefix and date but not the tail; ignored.
        touch(temp.path(), "PRE_240101_00009.csv").await;

        let pattern = FileNamePattern::compile("PRE_YYMMDD_<nnnnn>_nn(hhmm).csv").unwrap();
        let next = next_sequence(temp.path(), &pattern, date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(next, 5);
    }

    #[tokio::test]
    async fn test_missing_directory_yields_one() {
        let temp = TempDir::new().unwrap();
        let gone = temp.path().join("missing");

        let pattern = FileNamePattern::compile("PRE_YYMMDD_<nnnnn>.csv").unwrap();
        let next = next_sequence(&gone, &pattern, date(2024, 1, 1))
            .await
            .unwrap();
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn test_dir_locks_serialize_per_directory() {
        let locks = DirLocks::new();
        let dir = Path::new("/dest/a");

        let guard = locks.lock_for(dir).await;
        // A different directory is independent.
        let _other = locks.lock_for(Path::new("/dest/b")).await;

        // The same directory stays locked until the guard drops.
        let entry = locks.inner.lock().await.get(dir).cloned().unwrap();
        assert!(entry.try_lock().is_err());
        drop(guard);
        assert!(entry.try_lock().is_ok());
    }
}
