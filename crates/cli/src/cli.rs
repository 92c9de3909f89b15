//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts::{PurgePolicy, RelayConfig};
use std::path::PathBuf;

/// Grid Relay - stages telemetry readings and ships them in batches
#[derive(Parser, Debug)]
#[command(
    name = "grid-relay",
    author,
    version,
    about = "Telemetry staging and batch dispatch relay",
    long_about = "Stages grid readings in a redis-compatible store and relays them to a \n\
                  remote collection service in batches, authorized by a credential \n\
                  cached in a local durable store."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GRID_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GRID_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "GRID_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage one grid submission
    Ingest(IngestArgs),

    /// Send every staged grid to the remote service
    Push,

    /// Fetch a new credential and store it
    RefreshCredentials,

    /// Purge staged data
    Clean(CleanArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Run push / refresh / clean periodically until interrupted
    Schedule(ScheduleArgs),
}

/// Configuration file plus overrides, shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "grid-relay.toml",
        global = true,
        env = "GRID_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Override remote host from configuration
    #[arg(long, global = true, env = "SENSOR_STORE_HOSTNAME")]
    pub host: Option<String>,

    /// Override grid key prefix
    #[arg(long, global = true, env = "GRID_KEY")]
    pub grid_key: Option<String>,

    /// Override sensor key prefix
    #[arg(long, global = true, env = "SENSOR_KEY")]
    pub sensor_key: Option<String>,

    /// Override batch frequency (grids per request, <= 0 sends one request)
    #[arg(long, global = true, allow_negative_numbers = true, env = "PACKET_FREQUENCY")]
    pub frequency: Option<i64>,

    /// Override cleanup.policy for `clean` and the scheduled clean job
    #[arg(long, value_enum, global = true, env = "GRID_RELAY_CLEANUP_POLICY")]
    pub cleanup_policy: Option<PolicyArg>,
}

impl ConfigArgs {
    /// Apply overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(ref host) = self.host {
            config.remote.host = host.clone();
        }
        if let Some(ref prefix) = self.grid_key {
            config.staging.keys.grid_prefix = prefix.clone();
        }
        if let Some(ref prefix) = self.sensor_key {
            config.staging.keys.sensor_prefix = prefix.clone();
        }
        if let Some(frequency) = self.frequency {
            config.dispatch.frequency = frequency;
        }
        if let Some(policy) = self.cleanup_policy {
            config.cleanup.policy = policy.into();
        }
    }
}

/// Arguments for the `ingest` command
#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Grid identifier
    #[arg(short, long)]
    pub grid: String,

    /// JSON payload file (stdin when omitted)
    #[arg(short, long)]
    pub payload: Option<PathBuf>,
}

/// Arguments for the `clean` command
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Purge policy for this run only (defaults to cleanup.policy)
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `schedule` command
#[derive(Parser, Debug)]
pub struct ScheduleArgs {
    /// Seconds between push runs
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub push_every: u64,

    /// Seconds between credential refreshes (disabled when omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_every: Option<u64>,

    /// Seconds between cleanup runs (disabled when omitted)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub clean_every: Option<u64>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Purge policy as spelled on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Delete grid and sensor keys from the staging store
    Transient,
    /// Delete the durable Sensors and Grids buckets
    DurableBuckets,
}

impl From<PolicyArg> for PurgePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Transient => Self::Transient,
            PolicyArg::DurableBuckets => Self::DurableBuckets,
        }
    }
}
