//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the nmdose configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing and overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        use secrecy::ExposeSecret;
        let (caller, callee) = config.select_endpoints();

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Running Mode: {}", config.running_mode);
        println!("  Calling AE: {}", caller.aet);
        println!(
            "  Called AE: {} at {}:{}",
            callee.aet, callee.host, callee.port
        );
        println!("  Batch Start: {}", config.schedule.batch.start_date);
        println!("  Batch Days: {}", config.schedule.batch.batch_days);
        println!("  Daily Cutover: {}", config.schedule.daily.start_date);
        println!("  Categories: {:?}", config.retrieve.categories);
        println!("  Return Tags: {}", config.retrieve.return_tags.len());
        println!(
            "  Tools: {} / {} (timeout {}s)",
            config.protocol.find_command,
            config.protocol.move_command,
            config.protocol.timeout_seconds
        );
        if let Some(destination) = &config.protocol.move_destination {
            println!("  Move Destination: {destination}");
        }
        println!("  Transfers Enabled: {}", config.transfer.enabled);
        println!(
            "  PostgreSQL Connection: {}",
            config.postgresql.connection_string.expose_secret().redacted_url()
        );
        println!("  Max Connections: {}", config.postgresql.max_connections);
        println!();
        Ok(0)
    }
}
