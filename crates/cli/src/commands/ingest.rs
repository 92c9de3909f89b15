//! `ingest` command implementation.

use anyhow::{Context, Result};
use ingestion::Ingestor;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::info;

use super::context::{close_staging, load_config, open_staging};
use crate::cli::{ConfigArgs, IngestArgs};

/// Execute the `ingest` command
pub async fn run_ingest(config_args: &ConfigArgs, args: &IngestArgs) -> Result<()> {
    let config = load_config(config_args)?;

    let raw = read_payload(args.payload.as_deref()).await?;
    let payload = ingestion::decode_payload(&args.grid, &raw).context("Invalid grid payload")?;
    info!(grid = %args.grid, nodes = payload.data.len(), "Payload decoded");

    let staging = open_staging(&config).await?;
    let result = Ingestor::new(&staging, config.staging.keys.clone())
        .ingest(&args.grid, &payload)
        .await;
    close_staging(&staging).await;

    let report = result.with_context(|| format!("Failed to ingest grid '{}'", args.grid))?;
    println!(
        "Staged {} reading(s) for grid '{}'",
        report.nodes_written, report.grid_id
    );
    Ok(())
}

async fn read_payload(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read payload from {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read payload from stdin")?;
            Ok(raw)
        }
    }
}
