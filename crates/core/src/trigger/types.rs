//! Types for trigger-gated discovery.

use std::path::{Path, PathBuf};

/// A complete (data file, sentinel file) pair, valid for one discovery
/// pass. Both paths share the same stem and differ only in the trailing
/// suffix; a pair exists only if both paths existed at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// The data file to deliver.
    pub data_path: PathBuf,
    /// The sentinel whose existence marked the data file as complete.
    pub trigger_path: PathBuf,
}

impl FilePair {
    pub fn new(data_path: impl Into<PathBuf>, trigger_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            trigger_path: trigger_path.into(),
        }
    }

    /// The data file's name, for log lines.
    pub fn file_name(&self) -> &str {
        self.data_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<non-utf8>")
    }

    /// Directory both files live in.
    pub fn source_dir(&self) -> &Path {
        self.data_path.parent().unwrap_or(Path::new(""))
    }
}
