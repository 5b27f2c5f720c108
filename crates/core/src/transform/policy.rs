//! Identity and sequenced-rename transforms.

use std::path::Path;

use chrono::NaiveDate;
use tokio::fs;
use tracing::{info, warn};

use crate::fsops;
use crate::pattern::{FileNamePattern, PatternError};
use crate::sequence::{next_sequence, DirLocks};
use crate::trigger::FilePair;

use super::TransformError;

/// Per-destination strategy turning (source pair, destination
/// directory) into placed files.
#[derive(Debug, Clone)]
pub enum TransformPolicy {
    /// Copy the data file under its original basename. An existing
    /// file of the same name is overwritten without warning.
    Identity,

    /// Allocate a per-day sequence number from the destination's
    /// contents, render the data filename from the template and copy
    /// both the data file and its sentinel under the new names.
    SequencedRename {
        pattern: FileNamePattern,
        trigger_suffix: String,
    },
}

impl TransformPolicy {
    /// Build a sequenced-rename policy, rejecting templates that carry
    /// no sequence token before any run starts.
    pub fn sequenced_rename(
        pattern: FileNamePattern,
        trigger_suffix: impl Into<String>,
    ) -> Result<Self, PatternError> {
        if !pattern.has_sequence_token() {
            return Err(PatternError::MissingSequenceToken {
                template: pattern.template().to_string(),
            });
        }
        Ok(Self::SequencedRename {
            pattern,
            trigger_suffix: trigger_suffix.into(),
        })
    }

    /// Apply the transform for one destination.
    pub async fn apply(
        &self,
        pair: &FilePair,
        dest_dir: &Path,
        today: NaiveDate,
        locks: &DirLocks,
    ) -> Result<(), TransformError> {
        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| TransformError::DirectoryCreation {
                path: dest_dir.to_path_buf(),
                source: e,
            })?;

        match self {
            TransformPolicy::Identity => self.apply_identity(pair, dest_dir).await,
            TransformPolicy::SequencedRename {
                pattern,
                trigger_suffix,
            } => {
                self.apply_rename(pair, dest_dir, pattern, trigger_suffix, today, locks)
                    .await
            }
        }
    }

    async fn apply_identity(&self, pair: &FilePair, dest_dir: &Path) -> Result<(), TransformError> {
        let name = pair
            .data_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TransformError::InvalidFileName {
                path: pair.data_path.clone(),
            })?;
        let dst = dest_dir.join(name);

        copy(&pair.data_path, &dst).await?;
        info!("Copied {} to {}", name, dest_dir.display());
        Ok(())
    }

    async fn apply_rename(
        &self,
        pair: &FilePair,
        dest_dir: &Path,
        pattern: &FileNamePattern,
        trigger_suffix: &str,
        today: NaiveDate,
        locks: &DirLocks,
    ) -> Result<(), TransformError> {
        // Allocation and copy must not interleave with another rename
        // into the same directory, or both would observe the same
        // maximum and collide.
        let _guard = locks.lock_for(dest_dir).await;

        let sequence = next_sequence(dest_dir, pattern, today).await?;
        let data_name = pattern.render(today, sequence);
        let trigger_name = swap_suffix(&data_name, trigger_suffix);

        let data_dst = dest_dir.join(&data_name);
        copy(&pair.data_path, &data_dst).await?;

        // The pair was confirmed ready, so the source sentinel exists.
        // If its copy still fails, the already-placed data file stays:
        // reported as failure, not rolled back.
        let trigger_dst = dest_dir.join(&trigger_name);
        if let Err(e) = copy(&pair.trigger_path, &trigger_dst).await {
            warn!(
                "Data file {} placed but sentinel copy failed, leaving orphan in {}",
                data_name,
                dest_dir.display()
            );
            return Err(e);
        }

        info!(
            "Copied {} as {} (and sentinel {}) to {}",
            pair.file_name(),
            data_name,
            trigger_name,
            dest_dir.display()
        );
        Ok(())
    }
}

async fn copy(src: &Path, dst: &Path) -> Result<(), TransformError> {
    fsops::copy_file(src, dst)
        .await
        .map_err(|e| TransformError::Copy {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source: e,
        })
}

/// Replace the extension of a rendered data filename with the sentinel
/// suffix (`RPT_240101_00001.dat` -> `RPT_240101_00001.trg`).
fn swap_suffix(data_name: &str, trigger_suffix: &str) -> String {
    match data_name.rfind('.') {
        Some(idx) => format!("{}{}", &data_name[..idx], trigger_suffix),
        None => format!("{}{}", data_name, trigger_suffix),
    }
}
