// nmdose - DICOM Study Retrieval and Audit Tool
// Copyright (c) 2025 nmdose Contributors
// Licensed under the MIT License

//! # nmdose - DICOM Study Retrieval and Audit
//!
//! nmdose schedules incremental retrieval of imaging studies from a PACS. Each
//! batch run queries a date window with `findscu`, requests the matching
//! studies with `movescu`, and records every query and transfer attempt in
//! PostgreSQL.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Windowing** study dates from a persisted watermark
//! - **Parsing** `findscu` response dumps into attribute records
//! - **Auditing** every query and transfer attempt, append-only
//! - **Orchestrating** a run: query per category, deduplicate, transfer
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (window, parser, audit, state, retrieve)
//! - [`adapters`] - External integrations (protocol tools, PostgreSQL)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nmdose::config::load_config;
//! use nmdose::core::retrieve::{RetrieveCoordinator, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("nmdose.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = RetrieveCoordinator::new(config, shutdown_rx).await?;
//!     let summary = coordinator.execute_run(&RunOptions::default()).await?;
//!
//!     println!("Transferred {} studies", summary.transfers_succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Batch Windows
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nmdose::core::window::compute_window;
//!
//! let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
//!
//! // Resume from the watermark, three days at a time, never past the cutover
//! let window = compute_window(d(2022, 1, 1), 3, d(2022, 1, 10), Some(d(2022, 1, 9)));
//! assert_eq!(window.format_token(), "20220109-20220110");
//! ```
//!
//! ## Parsing Responses
//!
//! ```rust
//! use nmdose::core::parser::parse_responses;
//!
//! let dump = "I: Requesting Association\n\
//!             I: ---------------------------\n\
//!             I: Find Response: 1 (Pending)\n\
//!             I: (0020,000d) UI [1.2.3]\n";
//!
//! let records = parse_responses(dump);
//! assert_eq!(records[0].entity_identifier(), Some("1.2.3"));
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], built on [`domain::NmdoseError`]:
//!
//! ```rust,no_run
//! use nmdose::domain::NmdoseError;
//!
//! fn example() -> Result<(), NmdoseError> {
//!     let config = nmdose::config::load_config("nmdose.toml")?;
//!     println!("{} categories", config.retrieve.categories.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
