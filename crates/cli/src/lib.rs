//! Shared wiring for the dispatcher and receiver binaries.
//!
//! Both roles run the same pass: load and validate a config, build a
//! dispatcher per enabled directory entry, run each once, report the
//! merged totals. They differ only in which config file they read.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filegate_core::{dispatcher_for_entry, load_config, validate_config, RunSummary};

const ENVIRONMENTS: [&str; 4] = ["dev", "st", "uat", "prod"];

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Pick the deployment environment from the first CLI argument.
pub fn environment_from_args(mut args: impl Iterator<Item = String>) -> Result<String> {
    match args.next() {
        Some(env) if ENVIRONMENTS.contains(&env.as_str()) => Ok(env),
        Some(env) => bail!(
            "Unknown environment {:?}, expected one of: {}",
            env,
            ENVIRONMENTS.join(", ")
        ),
        None => bail!(
            "Missing environment argument, expected one of: {}",
            ENVIRONMENTS.join(", ")
        ),
    }
}

/// Resolve the config file for a role and environment. The environment
/// variable named by `override_var` takes precedence when set.
pub fn config_path(role: &str, environment: &str, override_var: &str) -> PathBuf {
    std::env::var(override_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(format!("config/{role}_{environment}.toml")))
}

/// One full pass for a role. Config problems are fatal; per-entry and
/// per-file failures are logged and the remaining entries still run,
/// so a stuck directory never blocks the others.
pub async fn run_role(role: &str, override_var: &str) -> Result<()> {
    let environment = environment_from_args(std::env::args().skip(1))?;
    let path = config_path(role, &environment, override_var);

    info!("Loading {} configuration from {:?}", role, path);
    let config =
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(
        "Configuration loaded: {} directory entries, {} servers",
        config.directories.len(),
        config.servers.len()
    );

    let mut totals = RunSummary::default();
    for entry in &config.directories {
        let dispatcher = match dispatcher_for_entry(entry, &config.servers) {
            Ok(Some(dispatcher)) => dispatcher,
            Ok(None) => continue,
            Err(e) => {
                error!(
                    "Skipping entry for {}: {}",
                    entry.source_directory.display(),
                    e
                );
                continue;
            }
        };

        match dispatcher.run().await {
            Ok(summary) => totals.merge(summary),
            Err(e) => error!(
                "Entry for {} failed: {}",
                entry.source_directory.display(),
                e
            ),
        }
    }

    info!(
        "{} pass complete: {} discovered, {} delivered, {} consumed, {} failed",
        role, totals.discovered, totals.delivered, totals.consumed, totals.failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> impl Iterator<Item = String> {
        items
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_environment_accepted() {
        for env in ENVIRONMENTS {
            assert_eq!(environment_from_args(args(&[env])).unwrap(), env);
        }
    }

    #[test]
    fn test_environment_rejected() {
        assert!(environment_from_args(args(&["staging"])).is_err());
        assert!(environment_from_args(args(&[])).is_err());
    }

    #[test]
    fn test_config_path_default() {
        let path = config_path("dispatcher", "uat", "FILEGATE_TEST_UNSET_VAR");
        assert_eq!(path, PathBuf::from("config/dispatcher_uat.toml"));
    }

    #[test]
    fn test_config_path_override() {
        std::env::set_var("FILEGATE_TEST_OVERRIDE_VAR", "/etc/filegate/custom.toml");
        let path = config_path("receiver", "prod", "FILEGATE_TEST_OVERRIDE_VAR");
        std::env::remove_var("FILEGATE_TEST_OVERRIDE_VAR");
        assert_eq!(path, PathBuf::from("/etc/filegate/custom.toml"));
    }
}
