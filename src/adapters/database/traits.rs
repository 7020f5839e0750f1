//! Database abstraction traits
//!
//! This module defines the traits that storage adapters must implement to
//! hold the batch watermark and the query/transfer audit trail.

use crate::core::audit::events::{QueryAuditEvent, TransferAuditEvent};
use crate::core::state::watermark::Watermark;
use crate::domain::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Connection-level operations of a storage backend
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Test the database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Create the audit and watermark tables if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    /// Human-readable backend name
    fn database_name(&self) -> &str;
}

/// Watermark persistence
///
/// Each advancement is appended as a new row. The current watermark is the
/// latest processed date ever recorded.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Latest processed date, or `None` before the first successful run
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get_last_processed_date(&self) -> Result<Option<NaiveDate>>;

    /// Record that every date up to `date` has been processed
    ///
    /// # Arguments
    ///
    /// * `date` - Last processed date
    /// * `run_id` - Run that completed the window
    /// * `dry_run` - If true, skip the write
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    async fn record_processed_date(
        &self,
        date: NaiveDate,
        run_id: Uuid,
        dry_run: bool,
    ) -> Result<()>;

    /// Most recent watermark rows, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get_history(&self, limit: usize) -> Result<Vec<Watermark>>;
}

/// Append-only audit persistence
///
/// Each call is a single auto-committed insert. Implementations never update
/// or delete rows.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Insert a query audit row and return its durable identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the row is rejected or the store is unreachable.
    async fn insert_query_event(&self, event: &QueryAuditEvent) -> Result<i64>;

    /// Insert a transfer audit row
    ///
    /// # Errors
    ///
    /// Returns an error if the row is rejected or the store is unreachable.
    async fn insert_transfer_event(&self, event: &TransferAuditEvent) -> Result<()>;
}
