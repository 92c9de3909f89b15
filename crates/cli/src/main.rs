//! # Grid Relay CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载、环境变量覆盖与验证
//! - 写入 / 分发 / 凭证刷新 / 清理的单次执行
//! - 周期调度与优雅关闭处理

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{
    run_clean, run_ingest, run_push, run_refresh_credentials, run_schedule, run_validate,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_observability(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Grid Relay CLI starting");

    let result = match &cli.command {
        Commands::Ingest(args) => run_ingest(&cli.config, args).await,
        Commands::Push => run_push(&cli.config).await,
        Commands::RefreshCredentials => run_refresh_credentials(&cli.config).await,
        Commands::Clean(args) => run_clean(&cli.config, args).await,
        Commands::Validate(args) => run_validate(&cli.config, args),
        Commands::Schedule(args) => run_schedule(&cli.config, args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging and metrics based on CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
    })
    .context("Failed to initialize observability")
}
