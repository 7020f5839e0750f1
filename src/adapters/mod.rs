//! External system integrations for nmdose.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`dimse`] - DICOM query and transfer through external network tools
//! - [`database`] - Database abstraction layer (trait-based)
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the retrieval run
//! can be tested with in-memory stores and scripted protocol invokers.
//!
//! ```rust,no_run
//! use nmdose::adapters::database::create_storage;
//! use nmdose::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("nmdose.toml")?;
//! let storage = create_storage(&config)?;
//! storage.database.test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod dimse;
pub mod postgresql;
