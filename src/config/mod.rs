//! Configuration management for nmdose.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! nmdose uses a single TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `NMDOSE_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! The loaded [`NmdoseConfig`] is an immutable value passed explicitly to the
//! components that need it; nothing caches it globally.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nmdose::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("nmdose.toml")?;
//!
//! let (caller, callee) = config.select_endpoints();
//! println!("{} -> {} ({}:{})", caller.aet, callee.aet, callee.host, callee.port);
//! println!("Categories: {:?}", config.retrieve.categories);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! running_mode = "clinical"
//!
//! [network.research]
//! aet = "RESEARCH"
//! host = "127.0.0.1"
//! port = 11112
//!
//! [network.clinical]
//! aet = "CLINICAL_PACS"
//! host = "10.10.0.20"
//! port = 104
//!
//! [network.simulation]
//! aet = "SIM_PACS"
//! host = "127.0.0.1"
//! port = 11113
//!
//! [schedule.batch]
//! start_date = "2022-01-01"
//! batch_days = 7
//!
//! [schedule.daily]
//! start_date = "2024-06-01"
//!
//! [retrieve]
//! categories = ["PT", "NM"]
//!
//! [postgresql]
//! connection_string = "${NMDOSE_DATABASE_URL}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, BatchScheduleConfig, DailyScheduleConfig, DicomEndpointConfig,
    LoggingConfig, NetworkConfig, NmdoseConfig, OutputConfig, PostgreSQLConfig, ProtocolConfig,
    RetrieveConfig, RunningMode, ScheduleConfig, TransferConfig,
};
pub use secret::{secret_connection_string, ConnectionString, SecretConnectionString};
