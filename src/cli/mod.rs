//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for nmdose using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// nmdose - watermark-driven DICOM study retrieval with auditing
#[derive(Parser, Debug)]
#[command(name = "nmdose")]
#[command(version, about, long_about = None)]
#[command(author = "nmdose Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "nmdose.toml", env = "NMDOSE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "NMDOSE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one batch: query, audit and transfer the next window
    Run(commands::run::RunArgs),

    /// Print the window the next run would query
    Window(commands::window::WindowArgs),

    /// Show the watermark history and the next window
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
