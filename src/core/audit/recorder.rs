//! Audit recorder
//!
//! Sanitizes audit events and hands them to the configured [`AuditStore`].

use crate::adapters::database::traits::AuditStore;
use crate::core::audit::events::{QueryAuditEvent, TransferAuditEvent};
use crate::core::audit::sanitize::{sanitize_query_event, sanitize_transfer_event};
use crate::domain::Result;
use std::sync::Arc;

/// Identifier returned for query events that were not written
pub const DRY_RUN_QUERY_ID: i64 = 0;

/// Writes query and transfer audit rows
///
/// Every call is one insert. Store failures are returned unchanged: the
/// caller treats them as fatal for the run.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore + Send + Sync>,
    dry_run: bool,
}

impl AuditRecorder {
    /// Create a recorder over an audit store
    ///
    /// # Arguments
    ///
    /// * `store` - Audit storage backend
    /// * `dry_run` - If true, events are logged instead of written
    pub fn new(store: Arc<dyn AuditStore + Send + Sync>, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    /// Record one query attempt
    ///
    /// # Returns
    ///
    /// The durable identifier of the inserted row, used to link the transfers
    /// of studies first seen by this query. In dry-run mode nothing is written
    /// and [`DRY_RUN_QUERY_ID`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the row or is unreachable.
    pub async fn record_query(&self, event: &QueryAuditEvent) -> Result<i64> {
        let event = sanitize_query_event(event);

        if self.dry_run {
            tracing::info!(
                category = %event.category,
                status = %event.status,
                result_count = event.result_count,
                "DRY RUN: Would record query audit event"
            );
            return Ok(DRY_RUN_QUERY_ID);
        }

        let query_id = self.store.insert_query_event(&event).await?;

        tracing::debug!(
            query_id,
            category = %event.category,
            status = %event.status,
            result_count = event.result_count,
            duration_ms = event.duration_ms,
            "Query audit event recorded"
        );

        Ok(query_id)
    }

    /// Record one transfer attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the row or is unreachable.
    pub async fn record_transfer(&self, event: &TransferAuditEvent) -> Result<()> {
        let event = sanitize_transfer_event(event);

        if self.dry_run {
            tracing::info!(
                study_instance_uid = %event.entity_key,
                status = %event.status,
                "DRY RUN: Would record transfer audit event"
            );
            return Ok(());
        }

        self.store.insert_transfer_event(&event).await?;

        tracing::debug!(
            study_instance_uid = %event.entity_key,
            query_id = ?event.query_id,
            status = %event.status,
            pending_count = event.pending_count,
            duration_ms = event.duration_ms,
            "Transfer audit event recorded"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::events::{AuditStatus, PeerEndpoint};
    use crate::domain::NmdoseError;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingStore {
        queries: Mutex<Vec<QueryAuditEvent>>,
        transfers: Mutex<Vec<TransferAuditEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl AuditStore for CapturingStore {
        async fn insert_query_event(&self, event: &QueryAuditEvent) -> Result<i64> {
            if self.fail {
                return Err(NmdoseError::Database("connection refused".into()));
            }
            let mut queries = self.queries.lock().unwrap();
            queries.push(event.clone());
            Ok(queries.len() as i64 + 100)
        }

        async fn insert_transfer_event(&self, event: &TransferAuditEvent) -> Result<()> {
            if self.fail {
                return Err(NmdoseError::Database("connection refused".into()));
            }
            self.transfers.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn endpoint() -> PeerEndpoint {
        PeerEndpoint {
            caller_id: "RESEARCH".into(),
            callee_id: "PACS".into(),
            peer_host: "127.0.0.1".into(),
            peer_port: 11112,
        }
    }

    fn query_event() -> QueryAuditEvent {
        QueryAuditEvent {
            timestamp: Utc::now(),
            endpoint: endpoint(),
            query_level: "STUDY".into(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            category: "PT".into(),
            result_count: 2,
            duration_ms: 120,
            status: AuditStatus::Success,
            error_detail: None,
        }
    }

    fn transfer_event(uid: &str) -> TransferAuditEvent {
        TransferAuditEvent {
            timestamp: Utc::now(),
            endpoint: endpoint(),
            pending_count: 0,
            duration_ms: 50,
            status: AuditStatus::Failure,
            error_detail: Some("E: Move Failed\0".into()),
            entity_key: uid.into(),
            query_id: Some(101),
        }
    }

    #[tokio::test]
    async fn test_record_query_returns_store_id() {
        let store = Arc::new(CapturingStore::default());
        let recorder = AuditRecorder::new(store.clone(), false);

        let id = recorder.record_query(&query_event()).await.unwrap();
        assert_eq!(id, 101);
        assert_eq!(store.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_transfer_sanitizes() {
        let store = Arc::new(CapturingStore::default());
        let recorder = AuditRecorder::new(store.clone(), false);

        recorder.record_transfer(&transfer_event("1.2.3\0")).await.unwrap();

        let transfers = store.transfers.lock().unwrap();
        assert_eq!(transfers[0].entity_key, "1.2.3");
        assert_eq!(transfers[0].error_detail.as_deref(), Some("E: Move Failed"));
    }

    #[tokio::test]
    async fn test_dry_run_skips_writes() {
        let store = Arc::new(CapturingStore::default());
        let recorder = AuditRecorder::new(store.clone(), true);

        let id = recorder.record_query(&query_event()).await.unwrap();
        recorder.record_transfer(&transfer_event("1.2.3")).await.unwrap();

        assert_eq!(id, DRY_RUN_QUERY_ID);
        assert!(store.queries.lock().unwrap().is_empty());
        assert!(store.transfers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let store = Arc::new(CapturingStore {
            fail: true,
            ..Default::default()
        });
        let recorder = AuditRecorder::new(store, false);

        let err = recorder.record_query(&query_event()).await.unwrap_err();
        assert!(err.is_storage_failure());
    }
}
