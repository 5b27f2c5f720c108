//! Discovery and consumption of ready file pairs.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::pattern::FileNamePattern;

use super::types::FilePair;
use super::TriggerError;

/// Discovers complete (data, sentinel) pairs in one source directory
/// and consumes sentinels after successful handoff.
pub struct TriggerGate {
    source_dir: PathBuf,
    data_suffix: String,
    trigger_suffix: String,
    pattern: Option<FileNamePattern>,
}

impl TriggerGate {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        data_suffix: impl Into<String>,
        trigger_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            data_suffix: data_suffix.into(),
            trigger_suffix: trigger_suffix.into(),
            pattern: None,
        }
    }

    /// Restrict discovery to data files matching a filename template.
    pub fn with_pattern(mut self, pattern: FileNamePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// List the source directory once and return every data file whose
    /// sibling sentinel exists. Non-recursive. A data file without a
    /// sentinel is an expected steady state (producer still writing)
    /// and is skipped with a warning; a file that vanishes between the
    /// listing and the sentinel check is skipped as well.
    pub async fn discover_ready_pairs(&self) -> Result<Vec<FilePair>, TriggerError> {
        let mut entries =
            fs::read_dir(&self.source_dir)
                .await
                .map_err(|e| TriggerError::Discovery {
                    path: self.source_dir.clone(),
                    source: e,
                })?;

        let mut pairs = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(TriggerError::Discovery {
                        path: self.source_dir.clone(),
                        source: e,
                    })
                }
            };

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!("Skipping non-UTF8 entry in {}", self.source_dir.display());
                continue;
            };
            if !name.ends_with(&self.data_suffix) {
                continue;
            }
            if let Some(pattern) = &self.pattern {
                if !pattern.matches(name) {
                    debug!("{} does not match pattern {}", name, pattern.template());
                    continue;
                }
            }

            let data_path = entry.path();
            // Producers may still be writing; anything that is not a
            // plain file by now is skipped, never a failure.
            match fs::metadata(&data_path).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    continue;
                }
            }

            let stem = &name[..name.len() - self.data_suffix.len()];
            let trigger_path = self
                .source_dir
                .join(format!("{}{}", stem, self.trigger_suffix));

            match fs::try_exists(&trigger_path).await {
                Ok(true) => pairs.push(FilePair::new(data_path, trigger_path)),
                Ok(false) => warn!("Trigger file not found for {}", name),
                Err(e) => warn!("Skipping {}: cannot check trigger file: {}", name, e),
            }
        }

        // Directory listing order is platform dependent.
        pairs.sort_by(|a, b| a.data_path.cmp(&b.data_path));
        Ok(pairs)
    }

    /// Delete the pair's sentinel, never its data file. Idempotent: an
    /// already-deleted sentinel succeeds silently.
    pub async fn consume(&self, pair: &FilePair) -> Result<(), TriggerError> {
        match fs::remove_file(&pair.trigger_path).await {
            Ok(()) => {
                info!("Deleted trigger file {}", pair.trigger_path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "Trigger file {} already gone",
                    pair.trigger_path.display()
                );
                Ok(())
            }
            Err(e) => Err(TriggerError::Sentinel {
                path: pair.trigger_path.clone(),
                source: e,
            }),
        }
    }
}
