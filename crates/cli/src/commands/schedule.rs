//! `schedule` command implementation.
//!
//! Runs the jobs one at a time as their tickers fire. A failed job is
//! logged and retried on its next tick only.

use anyhow::Result;
use contracts::RelayConfig;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{error, info, warn};

use super::clean::clean_once;
use super::context::load_config;
use super::push::push_once;
use super::refresh::refresh_once;
use crate::cli::{ConfigArgs, ScheduleArgs};

/// Execute the `schedule` command
pub async fn run_schedule(config_args: &ConfigArgs, args: &ScheduleArgs) -> Result<()> {
    let config = load_config(config_args)?;

    let mut push = ticker(args.push_every);
    let mut refresh = args.refresh_every.map(ticker);
    let mut clean = args.clean_every.map(ticker);

    info!(
        push_every = args.push_every,
        refresh_every = ?args.refresh_every,
        clean_every = ?args.clean_every,
        policy = %config.cleanup.policy,
        "Scheduler started"
    );

    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        // a running job is never interrupted; shutdown is observed between jobs
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping scheduler...");
                break;
            }
            _ = tick(&mut refresh) => {
                log_job("refresh-credentials", refresh_once(&config).await);
            }
            _ = push.tick() => {
                log_job("push", push_once(&config).await);
            }
            _ = tick(&mut clean) => {
                log_job("clean", clean_once(&config, config.cleanup.policy).await);
            }
        }
    }

    info!("Grid Relay scheduler finished");
    Ok(())
}

fn ticker(secs: u64) -> Interval {
    let mut ticker = interval(Duration::from_secs(secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Wait for the next tick of an optional ticker
async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn log_job<T: Debug>(job: &str, result: Result<T>) {
    match result {
        Ok(outcome) => info!(job, ?outcome, "Job complete"),
        Err(e) => error!(job, error = %format!("{e:#}"), "Job failed, waiting for next tick"),
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
