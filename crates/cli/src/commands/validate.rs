//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::RelayConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::{ConfigArgs, ValidateArgs};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    remote: String,
    staging_url: String,
    grid_prefix: String,
    sensor_prefix: String,
    durable_path: String,
    frequency: i64,
    cleanup_policy: String,
}

impl From<&RelayConfig> for ConfigSummary {
    fn from(config: &RelayConfig) -> Self {
        Self {
            version: format!("{:?}", config.version),
            remote: config.remote.host.clone(),
            staging_url: config.staging.url.clone(),
            grid_prefix: config.staging.keys.grid_prefix.clone(),
            sensor_prefix: config.staging.keys.sensor_prefix.clone(),
            durable_path: config.durable.path.display().to_string(),
            frequency: config.dispatch.frequency,
            cleanup_policy: config.cleanup.policy.to_string(),
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(config_args: &ConfigArgs, args: &ValidateArgs) -> Result<()> {
    info!(config = %config_args.config.display(), "Validating configuration");

    let result = validate_config(config_args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(config_args: &ConfigArgs) -> ValidationResult {
    let config_path = config_args.config.display().to_string();

    if !config_args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", config_args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    let loaded = ConfigLoader::load_from_path(&config_args.config).and_then(|mut config| {
        config_args.apply(&mut config);
        ConfigLoader::validate(&config)?;
        Ok(config)
    });

    match loaded {
        Ok(config) => {
            let warnings = ConfigLoader::warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary::from(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Remote: {}", summary.remote);
            println!("  Staging: {}", summary.staging_url);
            println!(
                "  Keys: {}:* / {}:*",
                summary.grid_prefix, summary.sensor_prefix
            );
            println!("  Durable store: {}", summary.durable_path);
            println!("  Frequency: {}", summary.frequency);
            println!("  Cleanup policy: {}", summary.cleanup_policy);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
