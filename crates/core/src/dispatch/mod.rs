//! Dispatch orchestration: discovery, fan-out, sentinel consumption.

mod remote;
mod shared_drive;
mod traits;
mod types;

pub use remote::RemoteDispatcher;
pub use shared_drive::SharedDriveDispatcher;
pub use traits::Dispatcher;
pub use types::RunSummary;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{
    ConfigError, DestinationType, DirectoryEntry, ServerInfo, TransformKind,
};
use crate::fanout::Destination;
use crate::pattern::{FileNamePattern, PatternError};
use crate::remote::{OpenSshStore, RemoteError};
use crate::transform::TransformPolicy;
use crate::trigger::{TriggerError, TriggerGate};

/// Errors that abort one directory entry's run. Other entries are
/// unaffected; the entry is retried from scratch on the next
/// invocation.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Discovery(#[from] TriggerError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Build the dispatcher for one directory entry, selecting the variant
/// from the closed set of destination types. Returns `None` for
/// disabled entries.
pub fn dispatcher_for_entry(
    entry: &DirectoryEntry,
    servers: &BTreeMap<String, ServerInfo>,
) -> Result<Option<Box<dyn Dispatcher>>, DispatchError> {
    if !entry.enabled {
        info!(
            "Transfer disabled for {}",
            entry.source_directory.display()
        );
        return Ok(None);
    }

    let mut gate = TriggerGate::new(
        &entry.source_directory,
        &entry.file_extension,
        &entry.trigger_extension,
    );
    if let Some(template) = &entry.file_name_pattern {
        gate = gate.with_pattern(FileNamePattern::compile(template)?);
    }

    match entry.destination_type {
        DestinationType::SharedDrive => {
            let mut destinations = Vec::with_capacity(entry.destinations.len());
            for destination in &entry.destinations {
                let policy = match destination.transform {
                    TransformKind::None => TransformPolicy::Identity,
                    TransformKind::Rename => {
                        let template = destination.rename_pattern.as_deref().ok_or_else(|| {
                            ConfigError::ValidationError(format!(
                                "destination {} uses rename without rename_pattern",
                                destination.path.display()
                            ))
                        })?;
                        TransformPolicy::sequenced_rename(
                            FileNamePattern::compile(template)?,
                            &entry.trigger_extension,
                        )?
                    }
                };
                destinations.push(Destination::new(&destination.path, policy));
            }
            Ok(Some(Box::new(SharedDriveDispatcher::new(
                gate,
                destinations,
            ))))
        }
        DestinationType::ExternalServer => {
            let server_name = entry.server_name.as_deref().ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "{}: external_server entry has no server_name",
                    entry.source_directory.display()
                ))
            })?;
            let server = servers.get(server_name).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "{}: no server configuration for {:?}",
                    entry.source_directory.display(),
                    server_name
                ))
            })?;
            let remote_directory = entry.remote_directory.clone().ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "{}: external_server entry has no remote_directory",
                    entry.source_directory.display()
                ))
            })?;

            let store = Arc::new(OpenSshStore::new(server.clone()));
            Ok(Some(Box::new(RemoteDispatcher::new(
                gate,
                store,
                remote_directory,
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    #[test]
    fn test_disabled_entry_yields_no_dispatcher() {
        let config = load_config_from_str(
            r#"
[[directories]]
enabled = false
source_directory = "/data/out"
file_extension = ".dat"
trigger_extension = ".trg"
destination_type = "shared_drive"

[[directories.destinations]]
path = "/mnt/share/in"
"#,
        )
        .unwrap();

        let dispatcher =
            dispatcher_for_entry(&config.directories[0], &config.servers).unwrap();
        assert!(dispatcher.is_none());
    }

    #[test]
    fn test_variant_selected_by_destination_type() {
        let config = load_config_from_str(
            r#"
[[directories]]
source_directory = "/data/out"
file_extension = ".dat"
trigger_extension = ".trg"
destination_type = "shared_drive"

[[directories.destinations]]
path = "/mnt/share/in"

[[directories]]
source_directory = "/data/out2"
file_extension = ".dat"
trigger_extension = ".trg"
destination_type = "external_server"
server_name = "mainframe"
remote_directory = "/incoming"

[servers.mainframe]
host = "files.example.com"
username = "feeds"
key_path = "/etc/filegate/id_ed25519"
"#,
        )
        .unwrap();

        let shared = dispatcher_for_entry(&config.directories[0], &config.servers)
            .unwrap()
            .unwrap();
        assert_eq!(shared.name(), "shared_drive");

        let remote = dispatcher_for_entry(&config.directories[1], &config.servers)
            .unwrap()
            .unwrap();
        assert_eq!(remote.name(), "external_server");
    }

    #[test]
    fn test_bad_rename_pattern_is_fatal_for_entry() {
        let config = load_config_from_str(
            r#"
[[directories]]
source_directory = "/data/out"
file_extension = ".dat"
trigger_extension = ".trg"
destination_type = "shared_drive"

[[directories.destinations]]
path = "/mnt/share/in"
transform = "rename"
rename_pattern = "PRE_YYMMDD.csv"
"#,
        )
        .unwrap();

        let result = dispatcher_for_entry(&config.directories[0], &config.servers);
        assert!(matches!(result, Err(DispatchError::Pattern(_))));
    }
}
