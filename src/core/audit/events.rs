//! Audit event shapes
//!
//! One [`QueryAuditEvent`] is written per category query attempt and one
//! [`TransferAuditEvent`] per unique study transfer attempt. Both are
//! immutable once written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a protocol invocation as recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    Failure,
}

impl AuditStatus {
    /// Column value
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "SUCCESS",
            AuditStatus::Failure => "FAILURE",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuditStatus::Success)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(AuditStatus::Success),
            "FAILURE" => Ok(AuditStatus::Failure),
            other => Err(format!("Unknown audit status '{other}'")),
        }
    }
}

/// Network identity of one side of an association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEndpoint {
    /// Calling AE title
    pub caller_id: String,

    /// Called AE title
    pub callee_id: String,

    /// Remote host name or address
    pub peer_host: String,

    /// Remote port
    pub peer_port: u16,
}

/// One query attempt for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAuditEvent {
    /// When the query was dispatched
    pub timestamp: DateTime<Utc>,

    /// Association identity
    #[serde(flatten)]
    pub endpoint: PeerEndpoint,

    /// Query/retrieve level, e.g. `STUDY`
    pub query_level: String,

    /// First date of the queried window
    pub start_date: NaiveDate,

    /// Last date of the queried window
    pub end_date: NaiveDate,

    /// Category filter, e.g. `PT`
    pub category: String,

    /// Number of response blocks parsed from the output
    pub result_count: usize,

    /// Wall time of the invocation
    pub duration_ms: u64,

    pub status: AuditStatus,

    /// Tool output, kept only for failed invocations
    pub error_detail: Option<String>,
}

/// One transfer attempt for one study
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAuditEvent {
    /// When the transfer was dispatched
    pub timestamp: DateTime<Utc>,

    /// Association identity
    #[serde(flatten)]
    pub endpoint: PeerEndpoint,

    /// Number of pending sub-operation responses seen
    pub pending_count: usize,

    /// Wall time of the invocation
    pub duration_ms: u64,

    pub status: AuditStatus,

    /// Tool output, kept only for failed invocations
    pub error_detail: Option<String>,

    /// Study Instance UID that was requested
    pub entity_key: String,

    /// Identifier of the query audit row in which the study was first seen
    pub query_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_column_text() {
        assert_eq!(AuditStatus::Success.as_str(), "SUCCESS");
        assert_eq!("failure".parse::<AuditStatus>(), Ok(AuditStatus::Failure));
        assert!("PENDING".parse::<AuditStatus>().is_err());
    }

    #[test]
    fn test_event_serializes_flat_endpoint() {
        let event = TransferAuditEvent {
            timestamp: Utc::now(),
            endpoint: PeerEndpoint {
                caller_id: "RESEARCH".into(),
                callee_id: "PACS".into(),
                peer_host: "10.0.0.5".into(),
                peer_port: 104,
            },
            pending_count: 2,
            duration_ms: 1500,
            status: AuditStatus::Success,
            error_detail: None,
            entity_key: "1.2.3".into(),
            query_id: Some(7),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["caller_id"], "RESEARCH");
        assert_eq!(json["peer_port"], 104);
        assert_eq!(json["status"], "SUCCESS");
    }
}
