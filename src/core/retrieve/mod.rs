//! Batch run orchestration
//!
//! This module provides the retrieval run:
//! - Window computation from the persisted watermark
//! - Per-category query, parse and audit
//! - Deduplicated transfers with bounded concurrency
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{RetrieveCoordinator, RunOptions, RunPhase};
pub use summary::{CategoryOutcome, RunError, RunErrorType, RunSummary};
