//! Text sanitization for audit columns
//!
//! Protocol tools pad values with NUL bytes, and PostgreSQL rejects any text
//! value containing `\0`. Every text field goes through [`sanitize_text`]
//! before it reaches the store.

use super::events::{PeerEndpoint, QueryAuditEvent, TransferAuditEvent};

/// Strip NUL and every control character other than `\n`, `\r` and `\t`
///
/// ```
/// use nmdose::core::audit::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("1.2.3\0"), "1.2.3");
/// assert_eq!(sanitize_text("line\x07one\nline two"), "lineone\nline two");
/// ```
pub fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input.map(|s| sanitize_text(s).trim().to_string())
}

fn sanitize_endpoint(endpoint: &PeerEndpoint) -> PeerEndpoint {
    PeerEndpoint {
        caller_id: sanitize_text(&endpoint.caller_id),
        callee_id: sanitize_text(&endpoint.callee_id),
        peer_host: sanitize_text(&endpoint.peer_host),
        peer_port: endpoint.peer_port,
    }
}

/// Return a copy of the event with every text field sanitized
pub fn sanitize_query_event(event: &QueryAuditEvent) -> QueryAuditEvent {
    QueryAuditEvent {
        endpoint: sanitize_endpoint(&event.endpoint),
        query_level: sanitize_text(&event.query_level),
        category: sanitize_text(&event.category),
        error_detail: sanitize_optional(event.error_detail.as_deref()),
        ..event.clone()
    }
}

/// Return a copy of the event with every text field sanitized
pub fn sanitize_transfer_event(event: &TransferAuditEvent) -> TransferAuditEvent {
    TransferAuditEvent {
        endpoint: sanitize_endpoint(&event.endpoint),
        error_detail: sanitize_optional(event.error_detail.as_deref()),
        entity_key: sanitize_text(&event.entity_key),
        ..event.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::events::AuditStatus;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_strips_nul_and_controls() {
        assert_eq!(sanitize_text("\0abc\0"), "abc");
        assert_eq!(sanitize_text("a\x1b[31mb"), "a[31mb");
        assert_eq!(sanitize_text("tab\tok\r\n"), "tab\tok\r\n");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn test_query_event_fields_sanitized() {
        let event = QueryAuditEvent {
            timestamp: Utc::now(),
            endpoint: PeerEndpoint {
                caller_id: "RESEARCH\0".into(),
                callee_id: "PACS".into(),
                peer_host: "pacs.local".into(),
                peer_port: 104,
            },
            query_level: "STUDY".into(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            category: "PT\0".into(),
            result_count: 0,
            duration_ms: 10,
            status: AuditStatus::Failure,
            error_detail: Some("E: Association Rejected\0\n".into()),
        };

        let clean = sanitize_query_event(&event);
        assert_eq!(clean.endpoint.caller_id, "RESEARCH");
        assert_eq!(clean.category, "PT");
        assert_eq!(clean.error_detail.as_deref(), Some("E: Association Rejected"));
        assert_eq!(clean.start_date, event.start_date);
    }
}
