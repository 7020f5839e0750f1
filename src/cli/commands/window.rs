//! Window command implementation
//!
//! This module implements the `window` command, which prints the date range
//! the next run would query without running anything.

use crate::adapters::database::create_storage;
use crate::config::load_config;
use crate::config::schema::{flexible_date, NmdoseConfig};
use crate::core::state::StateManager;
use crate::core::window::{compute_window, BatchWindow};
use chrono::NaiveDate;
use clap::Args;

/// Arguments for the window command
#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Use this watermark (YYYY-MM-DD or YYYYMMDD) instead of reading the database
    #[arg(long, value_name = "DATE")]
    pub watermark: Option<String>,
}

impl WindowArgs {
    /// Execute the window command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let last_watermark = match &self.watermark {
            Some(raw) => match flexible_date::parse(raw) {
                Ok(date) => Some(date),
                Err(e) => {
                    println!("❌ Invalid --watermark value");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            },
            None => {
                let storage = match create_storage(&config) {
                    Ok(s) => s,
                    Err(e) => {
                        println!("❌ Failed to connect to database");
                        println!("   Error: {e}");
                        return Ok(4); // Connection error exit code
                    }
                };
                let state_manager = StateManager::new_with_storage(storage.watermarks);
                match state_manager.load_last_processed_date().await {
                    Ok(date) => date,
                    Err(e) => {
                        println!("❌ Failed to load watermark");
                        println!("   Error: {e}");
                        return Ok(4);
                    }
                }
            }
        };

        let window = next_window(&config, last_watermark);
        print_window(&window, last_watermark);
        Ok(0)
    }
}

/// Window the next run would query for the given watermark
pub fn next_window(config: &NmdoseConfig, last_watermark: Option<NaiveDate>) -> BatchWindow {
    compute_window(
        config.schedule.batch.start_date,
        config.schedule.batch.batch_days,
        config.schedule.daily.start_date,
        last_watermark,
    )
}

pub(crate) fn print_window(window: &BatchWindow, last_watermark: Option<NaiveDate>) {
    match last_watermark {
        Some(date) => println!("  Watermark: {date}"),
        None => println!("  Watermark: none (first run)"),
    }
    if window.is_empty() {
        println!("  Next Window: caught up (start {} is past cutover {})", window.start, window.end);
    } else {
        println!(
            "  Next Window: {} ({} to {}, {} day(s))",
            window.format_token(),
            window.start,
            window.end,
            window.days()
        );
    }
}
