//! Configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration: the directories to process in one pass and the
/// remote servers external-server entries may reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub directories: Vec<DirectoryEntry>,
    #[serde(default)]
    pub servers: BTreeMap<String, ServerInfo>,
}

/// One configured source directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryEntry {
    /// Disabled entries are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub source_directory: PathBuf,

    /// Suffix of data files, including the dot (e.g. ".dat").
    pub file_extension: String,

    /// Suffix of sentinel files, including the dot (e.g. ".trg").
    pub trigger_extension: String,

    /// Optional filename template restricting which data files are
    /// considered (e.g. "POSnn_hhmm.dat").
    #[serde(default)]
    pub file_name_pattern: Option<String>,

    pub destination_type: DestinationType,

    /// Name of a `[servers.*]` entry, required for external servers.
    #[serde(default)]
    pub server_name: Option<String>,

    /// Remote directory uploads land in, required for external servers.
    #[serde(default)]
    pub remote_directory: Option<String>,

    /// Local destinations, required for shared-drive entries.
    #[serde(default)]
    pub destinations: Vec<DestinationEntry>,
}

fn default_enabled() -> bool {
    true
}

/// Where an entry's files go.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DestinationType {
    SharedDrive,
    ExternalServer,
}

/// One local destination within a shared-drive entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DestinationEntry {
    pub path: PathBuf,

    #[serde(default)]
    pub transform: TransformKind,

    /// Rename template, required when `transform = "rename"`.
    #[serde(default)]
    pub rename_pattern: Option<String>,
}

/// Per-destination transform selector.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Copy under the original basename.
    #[default]
    None,
    /// Sequenced rename from `rename_pattern`.
    Rename,
}

/// Pre-resolved connection parameters for one remote server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerInfo {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub key_path: PathBuf,
}

fn default_port() -> u16 {
    22
}
