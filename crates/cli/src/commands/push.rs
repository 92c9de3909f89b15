//! `push` command implementation.

use anyhow::{Context, Result};
use contracts::RelayConfig;
use dispatcher::{BatchDispatcher, CredentialCache, DispatchReport, HttpRemote};

use super::context::{close_staging, load_config, open_durable, open_staging};
use crate::cli::ConfigArgs;

/// Execute the `push` command
pub async fn run_push(config_args: &ConfigArgs) -> Result<()> {
    let config = load_config(config_args)?;
    let report = push_once(&config).await?;

    println!(
        "Sent {} grid(s), {} reading(s) in {} request(s)",
        report.grids_sent, report.readings_sent, report.requests
    );
    if report.orphan_members > 0 {
        println!(
            "Sent {} member(s) without a staged reading as blank",
            report.orphan_members
        );
    }
    Ok(())
}

/// One dispatch run against freshly opened stores
pub async fn push_once(config: &RelayConfig) -> Result<DispatchReport> {
    let remote = HttpRemote::from_config(&config.remote).context("Invalid remote endpoint")?;
    let durable = open_durable(config)?;
    let staging = open_staging(config).await?;

    let result = BatchDispatcher::new(
        &staging,
        CredentialCache::new(&durable),
        &remote,
        config.staging.keys.clone(),
    )
    .with_frequency(config.dispatch.frequency)
    .run()
    .await;

    close_staging(&staging).await;
    durable.close();

    result.context("Dispatch run failed")
}
