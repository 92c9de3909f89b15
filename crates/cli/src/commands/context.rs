//! Configuration and store handles shared by the commands.
//!
//! Every store is opened once per command (or per scheduled job) and
//! closed before the command returns, whatever its outcome.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{RelayConfig, StagingStore};
use durable_store::RedbStore;
use staging::RedisStagingStore;
use tracing::{info, warn};

use crate::cli::ConfigArgs;

/// Load the configuration file, apply overrides and validate the result
pub fn load_config(args: &ConfigArgs) -> Result<RelayConfig> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let mut config = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    args.apply(&mut config);
    ConfigLoader::validate(&config).context("Configuration invalid after applying overrides")?;

    for warning in ConfigLoader::warnings(&config) {
        warn!(%warning, "Configuration warning");
    }

    info!(
        remote = %config.remote.host,
        grid_prefix = %config.staging.keys.grid_prefix,
        sensor_prefix = %config.staging.keys.sensor_prefix,
        frequency = config.dispatch.frequency,
        "Configuration loaded"
    );
    Ok(config)
}

/// Connect to the staging store
pub async fn open_staging(config: &RelayConfig) -> Result<RedisStagingStore> {
    RedisStagingStore::connect(&config.staging.url)
        .await
        .context("Failed to connect to staging store")
}

/// Release the staging connection; failures are only logged
pub async fn close_staging(store: &RedisStagingStore) {
    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close staging store");
    }
}

/// Open (or create) the durable store
pub fn open_durable(config: &RelayConfig) -> Result<RedbStore> {
    RedbStore::open(&config.durable.path).with_context(|| {
        format!(
            "Failed to open durable store at {}",
            config.durable.path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_args(path: std::path::PathBuf) -> ConfigArgs {
        ConfigArgs {
            config: path,
            host: None,
            grid_key: None,
            sensor_key: None,
            frequency: None,
            cleanup_policy: None,
        }
    }

    fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("grid-relay.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[remote]
host = "https://collector.example.org/"

[dispatch]
frequency = 5
"#
        )
        .unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&config_args(dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_overrides_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = config_args(write_config(&dir));
        args.host = Some("http://127.0.0.1:8080".into());
        args.grid_key = Some("site".into());
        args.frequency = Some(0);

        let config = load_config(&args).unwrap();
        assert_eq!(config.remote.host, "http://127.0.0.1:8080");
        assert_eq!(config.staging.keys.grid_prefix, "site");
        assert_eq!(config.dispatch.frequency, 0);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = config_args(write_config(&dir));
        args.sensor_key = Some("grid".into());
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_open_durable_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = load_config(&config_args(write_config(&dir))).unwrap();
        config.durable.path = dir.path().join("relay.redb");
        let store = open_durable(&config).unwrap();
        store.close();
        assert!(config.durable.path.exists());
    }
}
