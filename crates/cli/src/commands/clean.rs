//! `clean` command implementation.

use anyhow::{Context, Result};
use contracts::{PurgePolicy, RelayConfig};
use reconciler::{DurableBucketPurge, PurgeReport, Reconciler, TransientPurge};

use super::context::{close_staging, load_config, open_durable, open_staging};
use crate::cli::{CleanArgs, ConfigArgs};

/// Execute the `clean` command
pub async fn run_clean(config_args: &ConfigArgs, args: &CleanArgs) -> Result<()> {
    let config = load_config(config_args)?;
    let policy = args
        .policy
        .map(PurgePolicy::from)
        .unwrap_or(config.cleanup.policy);

    let report = clean_once(&config, policy).await?;
    println!(
        "Purged {} entr{} ({} policy)",
        report.deleted,
        if report.deleted == 1 { "y" } else { "ies" },
        report.policy
    );
    Ok(())
}

/// One purge run; only the store targeted by `policy` is opened
pub async fn clean_once(config: &RelayConfig, policy: PurgePolicy) -> Result<PurgeReport> {
    let result = match policy {
        PurgePolicy::Transient => {
            let staging = open_staging(config).await?;
            let result = TransientPurge::new(&staging, config.staging.keys.clone())
                .purge()
                .await;
            close_staging(&staging).await;
            result
        }
        PurgePolicy::DurableBuckets => {
            let durable = open_durable(config)?;
            let result = DurableBucketPurge::new(&durable).purge().await;
            durable.close();
            result
        }
    };

    result.with_context(|| format!("Cleanup ({policy}) failed"))
}
