//! Run command implementation
//!
//! This module implements the `run` command: one batch over the next window,
//! followed by the watermark advancement when the batch fully succeeded.

use crate::config::load_config;
use crate::config::loader::split_list;
use crate::config::schema::duplicate_category;
use crate::core::retrieve::{RetrieveCoordinator, RunOptions, RunSummary};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Query and audit only; request no transfers
    #[arg(long)]
    pub query_only: bool,

    /// Dry run mode - query the archive but write no audit rows, request no
    /// transfers and leave the watermark untouched
    #[arg(long)]
    pub dry_run: bool,

    /// Keep the watermark where it is even if the run succeeds
    #[arg(long)]
    pub no_advance: bool,

    /// Override categories to query (comma-separated)
    #[arg(long)]
    pub category: Option<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let categories = match &self.category {
            Some(list) => {
                let categories = split_list(list);
                if categories.is_empty() {
                    eprintln!("--category requires at least one category");
                    return Ok(2);
                }
                if let Some(duplicate) = duplicate_category(&categories) {
                    eprintln!("--category lists '{duplicate}' more than once");
                    return Ok(2);
                }
                tracing::info!(categories = ?categories, "Overriding categories from CLI");
                Some(categories)
            }
            None => None,
        };

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - No audit rows, transfers or watermark updates");
            println!();
        }

        tracing::info!("Creating retrieve coordinator");
        let coordinator = match RetrieveCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create retrieve coordinator");
                eprintln!("Failed to initialize run: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let options = RunOptions {
            query_only: self.query_only,
            categories,
        };

        println!("🚀 Starting run...");
        println!();

        let summary = match coordinator.execute_run(&options).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        print_summary(&summary);

        if summary.is_caught_up() {
            println!("✅ Nothing to do: schedule is caught up with the daily cutover");
            return Ok(0);
        }

        if summary.interrupted {
            println!("⚠️  Run interrupted. The watermark was not advanced.");
            println!("   Run the same command to retry the window.");
            println!();
            tracing::info!("Run interrupted by user signal");
            return Ok(130); // SIGINT exit code (standard Unix convention)
        }

        if !summary.is_successful() {
            println!("⚠️  Run completed with failures. The watermark was not advanced.");
            return Ok(1); // Partial success
        }

        match summary.next_watermark() {
            Some(next) if !self.no_advance => {
                if let Err(e) = coordinator
                    .state_manager()
                    .advance_watermark(next, summary.run_id, dry_run)
                    .await
                {
                    tracing::error!(error = %e, "Failed to advance watermark");
                    eprintln!("Failed to advance watermark: {e}");
                    return Ok(5);
                }
                if dry_run {
                    println!("✅ Run completed (next run would resume from {next})");
                } else {
                    println!("✅ Run completed successfully! Next run resumes from {next}");
                }
            }
            _ => {
                println!("✅ Run completed successfully! Watermark left unchanged.");
            }
        }

        Ok(0)
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Run Summary:");
    println!("  Run ID: {}", summary.run_id);
    match summary.window {
        Some(window) => println!("  Window: {window}"),
        None => println!("  Window: caught up"),
    }
    for category in &summary.categories {
        println!(
            "  Query {}: {} ({} result(s), {} ms)",
            category.category, category.status, category.result_count, category.duration_ms
        );
    }
    println!("  Unique Studies: {}", summary.unique_studies);
    println!("  Discarded Records: {}", summary.discarded_records);
    println!("  Field Errors: {}", summary.field_errors);
    if summary.transfer_phase_ran {
        println!("  Transfers Succeeded: {}", summary.transfers_succeeded);
        println!("  Transfers Failed: {}", summary.transfers_failed);
    } else {
        println!("  Transfers: skipped");
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}
