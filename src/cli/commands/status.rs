//! Status command implementation
//!
//! This module implements the `status` command for displaying the watermark
//! history and the window the next run would query.

use crate::adapters::database::create_storage;
use crate::cli::commands::window::{next_window, print_window};
use crate::config::load_config;
use crate::core::state::StateManager;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of watermark rows to show
    #[arg(long, default_value_t = 10)]
    pub history: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking batch status");

        println!("📊 Batch Status");
        println!();

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let storage = match create_storage(&config) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to database");
                println!("   Error: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let state_manager = StateManager::new_with_storage(storage.watermarks);

        let last_watermark = match state_manager.load_last_processed_date().await {
            Ok(date) => date,
            Err(e) => {
                println!("❌ Failed to load watermark");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        println!("  Running Mode: {}", config.running_mode);
        print_window(&next_window(&config, last_watermark), last_watermark);
        println!();

        let history = match state_manager.history(self.history).await {
            Ok(h) => h,
            Err(e) => {
                println!("❌ Failed to load watermark history");
                println!("   Error: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        if history.is_empty() {
            println!("No batch history found.");
            println!("Run 'nmdose run' to process the first window.");
            return Ok(0);
        }

        println!("Last {} watermark update(s):", history.len());
        println!();
        println!("{:<20} {:<25} {:<40}", "Resume From", "Recorded At", "Run ID");
        println!("{}", "-".repeat(85));

        for watermark in history {
            let run_id = watermark
                .run_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<20} {:<25} {:<40}",
                watermark.last_processed_date,
                watermark.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                run_id
            );
        }

        println!();
        Ok(0)
    }
}
