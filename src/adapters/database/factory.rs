//! Database client factory
//!
//! This module provides factory functions to create storage handles from configuration.

use crate::adapters::database::traits::{AuditStore, DatabaseClient, WatermarkStore};
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::NmdoseConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Storage handles sharing one connection pool
#[derive(Clone)]
pub struct Storage {
    pub database: Arc<dyn DatabaseClient + Send + Sync>,
    pub watermarks: Arc<dyn WatermarkStore + Send + Sync>,
    pub audit: Arc<dyn AuditStore + Send + Sync>,
}

/// Create the database client, watermark store and audit store
///
/// All three are views of the same adapter, so they reuse a single
/// connection pool.
///
/// # Errors
///
/// Returns an error if the PostgreSQL client cannot be created
pub fn create_storage(config: &NmdoseConfig) -> Result<Storage> {
    tracing::info!("Creating PostgreSQL client, watermark and audit storage");
    let client = Arc::new(PostgreSQLClient::new(config.postgresql.clone())?);
    let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));

    Ok(Storage {
        database: adapter.clone() as Arc<dyn DatabaseClient + Send + Sync>,
        watermarks: adapter.clone() as Arc<dyn WatermarkStore + Send + Sync>,
        audit: adapter as Arc<dyn AuditStore + Send + Sync>,
    })
}
