//! PostgreSQL row models
//!
//! Column-typed mirrors of the domain audit events and watermark. Conversion
//! narrows unsigned counters to the signed integer types PostgreSQL stores.

use crate::core::audit::events::{QueryAuditEvent, TransferAuditEvent};
use crate::core::state::watermark::Watermark;
use crate::domain::{NmdoseError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

fn narrow_i32(value: usize, column: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| NmdoseError::Validation(format!("{column} out of range: {value}")))
}

fn narrow_i64(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| NmdoseError::Validation(format!("{column} out of range: {value}")))
}

/// Row of the `findscus` table
#[derive(Debug, Clone)]
pub struct FindscuRow {
    pub ts: DateTime<Utc>,
    pub calling_aet: String,
    pub called_aet: String,
    pub peer_host: String,
    pub peer_port: i32,
    pub query_retrieve_level: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub modalities_in_study: String,
    pub result_count: i32,
    pub duration_ms: i64,
    pub status: String,
    pub error_detail: Option<String>,
}

impl FindscuRow {
    /// Convert from a domain query event
    pub fn from_domain(event: &QueryAuditEvent) -> Result<Self> {
        Ok(Self {
            ts: event.timestamp,
            calling_aet: event.endpoint.caller_id.clone(),
            called_aet: event.endpoint.callee_id.clone(),
            peer_host: event.endpoint.peer_host.clone(),
            peer_port: i32::from(event.endpoint.peer_port),
            query_retrieve_level: event.query_level.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            modalities_in_study: event.category.clone(),
            result_count: narrow_i32(event.result_count, "result_count")?,
            duration_ms: narrow_i64(event.duration_ms, "duration_ms")?,
            status: event.status.as_str().to_string(),
            error_detail: event.error_detail.clone(),
        })
    }
}

/// Row of the `movescus` table
#[derive(Debug, Clone)]
pub struct MovescuRow {
    pub find_id: Option<i64>,
    pub ts: DateTime<Utc>,
    pub calling_aet: String,
    pub called_aet: String,
    pub peer_host: String,
    pub peer_port: i32,
    pub pending_count: i32,
    pub duration_ms: i64,
    pub status: String,
    pub error_detail: Option<String>,
    pub study_instance_uid: String,
}

impl MovescuRow {
    /// Convert from a domain transfer event
    pub fn from_domain(event: &TransferAuditEvent) -> Result<Self> {
        Ok(Self {
            find_id: event.query_id,
            ts: event.timestamp,
            calling_aet: event.endpoint.caller_id.clone(),
            called_aet: event.endpoint.callee_id.clone(),
            peer_host: event.endpoint.peer_host.clone(),
            peer_port: i32::from(event.endpoint.peer_port),
            pending_count: narrow_i32(event.pending_count, "pending_count")?,
            duration_ms: narrow_i64(event.duration_ms, "duration_ms")?,
            status: event.status.as_str().to_string(),
            error_detail: event.error_detail.clone(),
            study_instance_uid: event.entity_key.clone(),
        })
    }
}

/// Row of the `batch_status` table
#[derive(Debug, Clone)]
pub struct BatchStatusRow {
    pub last_processed_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    pub run_id: Option<Uuid>,
}

impl BatchStatusRow {
    /// Read from a `SELECT last_processed_date, recorded_at, run_id` row
    ///
    /// # Errors
    ///
    /// Returns an error if a column is missing or has an unexpected type.
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            last_processed_date: row.try_get("last_processed_date")?,
            recorded_at: row.try_get("recorded_at")?,
            run_id: row.try_get("run_id")?,
        })
    }

    /// Convert to the domain watermark
    pub fn to_domain(self) -> Watermark {
        Watermark {
            last_processed_date: self.last_processed_date,
            recorded_at: self.recorded_at,
            run_id: self.run_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::events::{AuditStatus, PeerEndpoint};

    fn endpoint() -> PeerEndpoint {
        PeerEndpoint {
            caller_id: "RESEARCH".into(),
            callee_id: "PACS".into(),
            peer_host: "pacs.local".into(),
            peer_port: 104,
        }
    }

    #[test]
    fn test_findscu_row_from_domain() {
        let event = QueryAuditEvent {
            timestamp: Utc::now(),
            endpoint: endpoint(),
            query_level: "STUDY".into(),
            start_date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(),
            category: "PT".into(),
            result_count: 3,
            duration_ms: 812,
            status: AuditStatus::Success,
            error_detail: None,
        };

        let row = FindscuRow::from_domain(&event).unwrap();
        assert_eq!(row.modalities_in_study, "PT");
        assert_eq!(row.peer_port, 104);
        assert_eq!(row.result_count, 3);
        assert_eq!(row.status, "SUCCESS");
    }

    #[test]
    fn test_movescu_row_rejects_overflow() {
        let event = TransferAuditEvent {
            timestamp: Utc::now(),
            endpoint: endpoint(),
            pending_count: 0,
            duration_ms: u64::MAX,
            status: AuditStatus::Failure,
            error_detail: Some("timeout".into()),
            entity_key: "1.2.3".into(),
            query_id: Some(9),
        };

        let err = MovescuRow::from_domain(&event).unwrap_err();
        assert!(matches!(err, NmdoseError::Validation(_)));
    }
}
