//! PostgreSQL adapter implementing database traits
//!
//! This module provides the implementation of DatabaseClient, WatermarkStore
//! and AuditStore for PostgreSQL.

use crate::adapters::database::traits::{AuditStore, DatabaseClient, WatermarkStore};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{BatchStatusRow, FindscuRow, MovescuRow};
use crate::core::audit::events::{QueryAuditEvent, TransferAuditEvent};
use crate::core::state::watermark::Watermark;
use crate::domain::{NmdoseError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// PostgreSQL implementation of database traits
///
/// This wraps the PostgreSQLClient and implements the storage traits.
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl DatabaseClient for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    fn database_name(&self) -> &str {
        "postgresql"
    }
}

#[async_trait]
impl WatermarkStore for PostgreSQLAdapter {
    async fn get_last_processed_date(&self) -> Result<Option<NaiveDate>> {
        let query = "SELECT last_processed_date FROM batch_status \
                     ORDER BY last_processed_date DESC LIMIT 1";

        let rows = self.client.query(query, &[]).await?;

        match rows.first() {
            Some(row) => {
                let date: NaiveDate = row.try_get("last_processed_date").map_err(|e| {
                    NmdoseError::State(format!("Invalid batch_status row: {e}"))
                })?;
                Ok(Some(date))
            }
            None => Ok(None),
        }
    }

    async fn record_processed_date(
        &self,
        date: NaiveDate,
        run_id: Uuid,
        dry_run: bool,
    ) -> Result<()> {
        if dry_run {
            tracing::info!(
                last_processed_date = %date,
                run_id = %run_id,
                "DRY RUN: Would record processed date in PostgreSQL"
            );
            return Ok(());
        }

        let insert_query = r#"
            INSERT INTO batch_status (last_processed_date, recorded_at, run_id)
            VALUES ($1, now(), $2)
        "#;

        self.client.execute(insert_query, &[&date, &run_id]).await?;

        tracing::debug!(last_processed_date = %date, run_id = %run_id, "Watermark row inserted");
        Ok(())
    }

    async fn get_history(&self, limit: usize) -> Result<Vec<Watermark>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query = r#"
            SELECT last_processed_date, recorded_at, run_id
            FROM batch_status
            ORDER BY last_processed_date DESC, recorded_at DESC
            LIMIT $1
        "#;

        let rows = self.client.query(query, &[&limit]).await?;

        rows.iter()
            .map(|row| BatchStatusRow::from_row(row).map(BatchStatusRow::to_domain))
            .collect()
    }
}

#[async_trait]
impl AuditStore for PostgreSQLAdapter {
    async fn insert_query_event(&self, event: &QueryAuditEvent) -> Result<i64> {
        let row = FindscuRow::from_domain(event)?;

        let insert_query = r#"
            INSERT INTO findscus (
                ts, calling_aet, called_aet, peer_host, peer_port,
                query_retrieve_level, start_date, end_date, modalities_in_study,
                result_count, duration_ms, status, error_detail
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING find_id
        "#;

        let inserted = self
            .client
            .query_one(
                insert_query,
                &[
                    &row.ts,
                    &row.calling_aet,
                    &row.called_aet,
                    &row.peer_host,
                    &row.peer_port,
                    &row.query_retrieve_level,
                    &row.start_date,
                    &row.end_date,
                    &row.modalities_in_study,
                    &row.result_count,
                    &row.duration_ms,
                    &row.status,
                    &row.error_detail,
                ],
            )
            .await?;

        inserted
            .try_get::<_, i64>("find_id")
            .map_err(|e| NmdoseError::Database(format!("Missing find_id after insert: {e}")))
    }

    async fn insert_transfer_event(&self, event: &TransferAuditEvent) -> Result<()> {
        let row = MovescuRow::from_domain(event)?;

        let insert_query = r#"
            INSERT INTO movescus (
                find_id, ts, calling_aet, called_aet, peer_host, peer_port,
                pending_count, duration_ms, status, error_detail, study_instance_uid
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#;

        self.client
            .execute(
                insert_query,
                &[
                    &row.find_id,
                    &row.ts,
                    &row.calling_aet,
                    &row.called_aet,
                    &row.peer_host,
                    &row.peer_port,
                    &row.pending_count,
                    &row.duration_ms,
                    &row.status,
                    &row.error_detail,
                    &row.study_instance_uid,
                ],
            )
            .await?;

        Ok(())
    }
}
