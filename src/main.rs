// nmdose - DICOM Study Retrieval and Audit Tool
// Copyright (c) 2025 nmdose Contributors
// Licensed under the MIT License

use clap::Parser;
use nmdose::cli::{Cli, Commands};
use nmdose::config::LoggingConfig;
use nmdose::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Console-only logging; the configuration file has not been read yet
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let _logging_guard = match init_logging(log_level, &LoggingConfig::console_only()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "nmdose - DICOM study retrieval and audit"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown_signal(shutdown_tx));

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    process::exit(exit_code);
}

/// Flip the shutdown flag on the first SIGINT or SIGTERM
///
/// In-flight tool invocations finish; no new query or transfer starts.
async fn forward_shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let signal_name = match wait_for_signal().await {
        Ok(name) => name,
        Err(e) => {
            tracing::error!(error = %e, "Cannot listen for shutdown signals");
            return;
        }
    };

    tracing::warn!(signal = signal_name, "Shutdown requested");
    eprintln!("\n⚠️  {signal_name} received: stopping after the current step...");
    let _ = shutdown_tx.send(true);
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl+C")
}

/// Dispatch to the selected subcommand
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Window(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
