//! `refresh-credentials` command implementation.

use anyhow::{Context, Result};
use contracts::RelayConfig;
use dispatcher::{CredentialCache, HttpRemote};

use super::context::{load_config, open_durable};
use crate::cli::ConfigArgs;

/// Execute the `refresh-credentials` command
pub async fn run_refresh_credentials(config_args: &ConfigArgs) -> Result<()> {
    let config = load_config(config_args)?;
    refresh_once(&config).await?;
    println!("Credential refreshed");
    Ok(())
}

/// One credential refresh against a freshly opened durable store
pub async fn refresh_once(config: &RelayConfig) -> Result<()> {
    let remote = HttpRemote::from_config(&config.remote).context("Invalid remote endpoint")?;
    let durable = open_durable(config)?;

    let result = CredentialCache::new(&durable).refresh(&remote).await;
    durable.close();

    result.map(|_| ()).context("Credential refresh failed")
}
