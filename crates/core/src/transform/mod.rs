//! Per-destination transform policies.

mod policy;

pub use policy::TransformPolicy;

use std::path::PathBuf;
use thiserror::Error;

use crate::pattern::PatternError;

/// Errors from applying a transform to one destination. Always
/// recoverable at the fan-out level: the destination's outcome is
/// recorded and the remaining destinations are still attempted.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The destination directory could not be created.
    #[error("failed to create destination directory {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A copy into the destination failed.
    #[error("failed to copy {src} to {dst}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source path has a name that cannot be represented as UTF-8.
    #[error("file name is not valid UTF-8: {path}")]
    InvalidFileName { path: PathBuf },

    /// The rename template could not be used.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}
