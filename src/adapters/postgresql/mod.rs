//! PostgreSQL database integration
//!
//! This module provides integration with PostgreSQL for storing query and
//! transfer audit rows and the batch watermark.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{BatchStatusRow, FindscuRow, MovescuRow};
