//! Filename templates with digit placeholders.
//!
//! A template such as `POSnn_hhmm.dat` or `PRE_YYMMDD_<nnnnn>.csv` is
//! compiled once into a [`FileNamePattern`], which can test candidate
//! filenames against the template, render a final filename from a date
//! and an allocated sequence number, and build the per-day regex used
//! for sequence allocation.

mod template;

pub use template::FileNamePattern;

use thiserror::Error;

/// Errors raised when compiling or using a filename template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The template string is empty.
    #[error("filename template is empty")]
    EmptyTemplate,

    /// The template has no `<nnnnn>` sequence token, so it cannot be
    /// used for sequenced renaming.
    #[error("template {template:?} has no <nnnnn> sequence token")]
    MissingSequenceToken { template: String },

    /// The generated regular expression failed to compile.
    #[error("failed to compile template {template:?}: {detail}")]
    Compile { template: String, detail: String },
}
