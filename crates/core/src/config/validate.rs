//! Configuration validation.

use super::types::{Config, DestinationType, TransformKind};
use super::ConfigError;

/// Validate the configuration before any dispatch run starts.
///
/// Checks, per directory entry:
/// - data and trigger extensions are dot-prefixed suffixes
/// - shared-drive entries have at least one destination
/// - external-server entries name a known server and a remote directory
/// - rename destinations carry a rename pattern
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    for (index, entry) in config.directories.iter().enumerate() {
        let context = format!(
            "directories[{}] ({})",
            index,
            entry.source_directory.display()
        );

        for (label, extension) in [
            ("file_extension", &entry.file_extension),
            ("trigger_extension", &entry.trigger_extension),
        ] {
            if !extension.starts_with('.') || extension.len() < 2 {
                return Err(ConfigError::ValidationError(format!(
                    "{}: {} {:?} must start with '.'",
                    context, label, extension
                )));
            }
        }
        if entry.file_extension == entry.trigger_extension {
            return Err(ConfigError::ValidationError(format!(
                "{}: file_extension and trigger_extension must differ",
                context
            )));
        }

        match entry.destination_type {
            DestinationType::SharedDrive => {
                if entry.destinations.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "{}: shared_drive entry has no destinations",
                        context
                    )));
                }
                for destination in &entry.destinations {
                    if destination.transform == TransformKind::Rename
                        && destination.rename_pattern.is_none()
                    {
                        return Err(ConfigError::ValidationError(format!(
                            "{}: destination {} uses rename without rename_pattern",
                            context,
                            destination.path.display()
                        )));
                    }
                }
            }
            DestinationType::ExternalServer => {
                let server_name = entry.server_name.as_deref().ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "{}: external_server entry has no server_name",
                        context
                    ))
                })?;
                if !config.servers.contains_key(server_name) {
                    return Err(ConfigError::ValidationError(format!(
                        "{}: no server configuration for {:?}",
                        context, server_name
                    )));
                }
                if entry.remote_directory.is_none() {
                    return Err(ConfigError::ValidationError(format!(
                        "{}: external_server entry has no remote_directory",
                        context
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn shared_drive_toml(destination: &str) -> String {
        format!(
            r#"
[[directories]]
source_directory = "/data/out"
file_extension = ".dat"
trigger_extension = ".trg"
destination_type = "shared_drive"

{destination}
"#
        )
    }

    #[test]
    fn test_valid_shared_drive() {
        let config = load_config_from_str(&shared_drive_toml(
            r#"
[[directories.destinations]]
path = "/mnt/share/in"
transform = "rename"
rename_pattern = "PRE_YYMMDD_<nnnnn>.csv"
"#,
        ))
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_shared_drive_requires_destinations() {
        let config = load_config_from_str(&shared_drive_toml("")).unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rename_requires_pattern() {
        let config = load_config_from_str(&shared_drive_toml(
            r#"
[[directories.destinations]]
path = "/mnt/share/in"
transform = "rename"
"#,
        ))
        .unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_extension_must_be_dot_prefixed() {
        let toml = r#"
[[directories]]
source_directory = "/data/out"
file_extension = "dat"
trigger_extension = ".trg"
destination_type = "shared_drive"

[[directories.destinations]]
path = "/mnt/share/in"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_external_server_must_be_known() {
        let toml = r#"
[[directories]]
source_directory = "/data/out"
file_extension = ".dat"
trigger_extension = ".trg"
destination_type = "external_server"
server_name = "mainframe"
remote_directory = "/incoming"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
