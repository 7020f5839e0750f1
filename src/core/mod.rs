//! Core business logic for nmdose.
//!
//! # Modules
//!
//! - [`window`] - Batch window calculation from the watermark
//! - [`parser`] - Query response parsing and study summaries
//! - [`audit`] - Query and transfer audit events and recorder
//! - [`state`] - Watermark state management
//! - [`rawlog`] - Raw tool output files
//! - [`retrieve`] - Batch run orchestration
//!
//! # Run Workflow
//!
//! 1. **Load State**: Read the last processed date
//! 2. **Window**: Compute `[start, end]`, clamped to the daily cutover
//! 3. **Query**: Run the query tool once per category and audit each attempt
//! 4. **Deduplicate**: Keep each study instance UID once, in first-seen order
//! 5. **Transfer**: Run the transfer tool per study and audit each attempt
//! 6. **Report**: Log the run summary; the caller advances the watermark
//!
//! # Example
//!
//! ```rust,no_run
//! use nmdose::config::load_config;
//! use nmdose::core::retrieve::{RetrieveCoordinator, RunOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("nmdose.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = RetrieveCoordinator::new(config, shutdown_rx).await?;
//! let summary = coordinator.execute_run(&RunOptions::default()).await?;
//!
//! if let Some(next) = summary.next_watermark() {
//!     coordinator
//!         .state_manager()
//!         .advance_watermark(next, summary.run_id, false)
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod parser;
pub mod rawlog;
pub mod retrieve;
pub mod state;
pub mod window;
