//! Trigger-gated file handoff.
//!
//! Moves data files from producer directories to shared-filesystem or
//! remote-server destinations, gated on companion sentinel files and
//! optionally renaming with a per-destination, date- and
//! sequence-stamped template.

pub mod config;
pub mod dispatch;
pub mod fanout;
pub mod fsops;
pub mod pattern;
pub mod remote;
pub mod sequence;
pub mod testing;
pub mod transform;
pub mod trigger;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DestinationEntry,
    DestinationType, DirectoryEntry, ServerInfo, TransformKind,
};
pub use dispatch::{
    dispatcher_for_entry, DispatchError, Dispatcher, RemoteDispatcher, RunSummary,
    SharedDriveDispatcher,
};
pub use fanout::{deliver, Destination, DispatchOutcome};
pub use pattern::{FileNamePattern, PatternError};
pub use remote::{OpenSshStore, RemoteError, RemoteSession, RemoteStore};
pub use sequence::{next_sequence, DirLocks};
pub use transform::{TransformError, TransformPolicy};
pub use trigger::{FilePair, TriggerError, TriggerGate};
