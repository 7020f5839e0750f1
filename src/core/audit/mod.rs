//! Query and transfer audit trail
//!
//! - [`events`] - Audit event shapes and status
//! - [`sanitize`] - Control-character stripping for text columns
//! - [`recorder`] - The [`AuditRecorder`] that writes events to a store

pub mod events;
pub mod recorder;
pub mod sanitize;

pub use events::{AuditStatus, PeerEndpoint, QueryAuditEvent, TransferAuditEvent};
pub use recorder::{AuditRecorder, DRY_RUN_QUERY_ID};
