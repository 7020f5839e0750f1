//! Database abstraction layer
//!
//! This module provides a trait-based abstraction for database operations so
//! the retrieval run can be exercised against in-memory stores in tests.

pub mod factory;
pub mod traits;

pub use factory::{create_storage, Storage};
pub use traits::{AuditStore, DatabaseClient, WatermarkStore};
