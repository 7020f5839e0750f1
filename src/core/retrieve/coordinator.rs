//! Retrieve coordinator - main orchestrator for a batch run
//!
//! One run computes the date window, queries every configured category,
//! records a query audit row per category, deduplicates the returned studies
//! and requests a transfer for each, recording a transfer audit row per study.
//!
//! Tool failures are data: they are audited with `FAILURE` and the run goes
//! on. Audit write failures abort the run.

use crate::adapters::database::traits::{AuditStore, WatermarkStore};
use crate::adapters::database::{create_storage, Storage};
use crate::adapters::dimse::{
    find_args, move_args, Association, InvocationOutcome, ProcessInvoker, ProtocolInvoker,
    QUERY_RETRIEVE_LEVEL,
};
use crate::config::NmdoseConfig;
use crate::core::audit::events::{AuditStatus, QueryAuditEvent, TransferAuditEvent};
use crate::core::audit::AuditRecorder;
use crate::core::parser::{
    count_pending_responses, parse_responses, AttributeRecord, StudySummary,
};
use crate::core::rawlog::RawLogWriter;
use crate::core::retrieve::summary::{CategoryOutcome, RunError, RunErrorType, RunSummary};
use crate::core::state::StateManager;
use crate::core::window::{compute_window, BatchWindow};
use crate::domain::ids::StudyInstanceUid;
use crate::domain::tag::DicomTag;
use crate::domain::{NmdoseError, Result};
use crate::log_phase;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use uuid::Uuid;

/// Phases of a batch run, emitted as structured log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    WindowComputed,
    QueryDispatched,
    QueryAudited,
    Dedup,
    TransferDispatched,
    TransferAudited,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Init => "INIT",
            RunPhase::WindowComputed => "WINDOW_COMPUTED",
            RunPhase::QueryDispatched => "QUERY_DISPATCHED",
            RunPhase::QueryAudited => "QUERY_AUDITED",
            RunPhase::Dedup => "DEDUP",
            RunPhase::TransferDispatched => "TRANSFER_DISPATCHED",
            RunPhase::TransferAudited => "TRANSFER_AUDITED",
            RunPhase::Done => "DONE",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run switches layered over the configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Stop after deduplication
    pub query_only: bool,

    /// Categories to query instead of `retrieve.categories`
    pub categories: Option<Vec<String>>,
}

/// A study selected for transfer
#[derive(Debug, Clone)]
struct PendingTransfer {
    uid: StudyInstanceUid,
    /// Query audit row of the category where the study was first seen
    query_id: i64,
}

enum TransferResult {
    Succeeded,
    Failed(RunError),
    Skipped,
}

/// Retrieve coordinator
pub struct RetrieveCoordinator {
    config: NmdoseConfig,
    invoker: Arc<dyn ProtocolInvoker + Send + Sync>,
    recorder: AuditRecorder,
    state_manager: Arc<StateManager>,
    raw_logs: Option<RawLogWriter>,
    return_tags: Vec<DicomTag>,
    shutdown_signal: watch::Receiver<bool>,
}

impl RetrieveCoordinator {
    /// Create a coordinator backed by PostgreSQL and the external tools
    ///
    /// The audit schema is created if missing, except in dry-run mode where
    /// only the connection is tested.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or the configuration
    /// cannot be turned into query keys.
    pub async fn new(config: NmdoseConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let Storage {
            database,
            watermarks,
            audit,
        } = create_storage(&config)?;

        if config.application.dry_run {
            database.test_connection().await?;
            tracing::info!("DRY RUN: Would ensure audit schema exists");
        } else {
            database.ensure_schema().await?;
        }

        Self::with_components(
            config,
            Arc::new(ProcessInvoker::new()),
            audit,
            watermarks,
            shutdown_signal,
        )
    }

    /// Create a coordinator from explicit collaborators
    ///
    /// # Errors
    ///
    /// Returns [`NmdoseError::Configuration`] if a return tag cannot be parsed.
    pub fn with_components(
        config: NmdoseConfig,
        invoker: Arc<dyn ProtocolInvoker + Send + Sync>,
        audit_store: Arc<dyn AuditStore + Send + Sync>,
        watermark_store: Arc<dyn WatermarkStore + Send + Sync>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let return_tags = config
            .retrieve
            .parsed_return_tags()
            .map_err(NmdoseError::Configuration)?;

        let raw_logs = config
            .output
            .enabled
            .then(|| RawLogWriter::new(&config.output.raw_log_dir));

        Ok(Self {
            recorder: AuditRecorder::new(audit_store, config.application.dry_run),
            state_manager: Arc::new(StateManager::new_with_storage(watermark_store)),
            invoker,
            raw_logs,
            return_tags,
            shutdown_signal,
            config,
        })
    }

    /// State manager sharing this coordinator's watermark store
    pub fn state_manager(&self) -> &Arc<StateManager> {
        &self.state_manager
    }

    /// Compute the window the next run would query
    ///
    /// # Errors
    ///
    /// Returns an error if the watermark cannot be read.
    pub async fn next_window(&self) -> Result<BatchWindow> {
        let last_watermark = self.state_manager.load_last_processed_date().await?;
        let schedule = &self.config.schedule;

        Ok(compute_window(
            schedule.batch.start_date,
            schedule.batch.batch_days,
            schedule.daily.start_date,
            last_watermark,
        ))
    }

    /// Execute one batch run
    ///
    /// The watermark is never advanced here. The caller decides from the
    /// returned summary, see [`RunSummary::can_advance_watermark`].
    ///
    /// # Errors
    ///
    /// Returns an error if the watermark cannot be read or an audit row
    /// cannot be written.
    pub async fn execute_run(&self, options: &RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        let mut summary = RunSummary::new(run_id);

        log_phase!(
            run_id,
            RunPhase::Init.as_str(),
            running_mode = %self.config.running_mode,
            dry_run = self.config.application.dry_run
        );

        let window = self.next_window().await?;
        if window.is_empty() {
            tracing::info!(
                run_id = %run_id,
                start = %window.start,
                cutover = %window.end,
                "Schedule is caught up, nothing to query"
            );
            log_phase!(run_id, RunPhase::Done.as_str(), caught_up = true);
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        summary.window = Some(window);
        log_phase!(run_id, RunPhase::WindowComputed.as_str(), window = %window);

        let (caller, callee) = self.config.select_endpoints();
        let association = Association::from_endpoints(caller, callee);

        let categories = options
            .categories
            .clone()
            .unwrap_or_else(|| self.config.retrieve.categories.clone());

        // Study UID -> query audit id of the first category that returned it
        let mut studies: IndexMap<String, PendingTransfer> = IndexMap::new();

        for category in &categories {
            if self.is_shutdown_requested() {
                self.mark_interrupted(&mut summary, "query phase");
                break;
            }

            let (outcome, records) = self
                .query_category(run_id, &association, &window, category, &mut summary)
                .await?;

            for record in records {
                let study = StudySummary::from_record(&record);
                for field_error in &study.field_errors {
                    tracing::warn!(
                        run_id = %run_id,
                        category = %category,
                        tag = %field_error.tag,
                        value = %field_error.value,
                        error = %field_error.message,
                        "Malformed attribute in query response"
                    );
                }
                summary.field_errors += study.field_errors.len();

                let uid = match record.entity_identifier().map(StudyInstanceUid::new) {
                    Some(Ok(uid)) => uid,
                    Some(Err(e)) => {
                        tracing::warn!(
                            run_id = %run_id,
                            category = %category,
                            error = %e,
                            "Discarding response with invalid study instance UID"
                        );
                        summary.discarded_records += 1;
                        continue;
                    }
                    None => {
                        tracing::debug!(
                            run_id = %run_id,
                            category = %category,
                            "Discarding response without study instance UID"
                        );
                        summary.discarded_records += 1;
                        continue;
                    }
                };

                studies
                    .entry(uid.as_str().to_string())
                    .or_insert(PendingTransfer {
                        uid,
                        query_id: outcome.query_id,
                    });
            }

            summary.categories.push(outcome);
        }

        summary.unique_studies = studies.len();
        log_phase!(
            run_id,
            RunPhase::Dedup.as_str(),
            unique_studies = studies.len(),
            discarded_records = summary.discarded_records
        );

        let transfer_enabled = self.config.transfer.enabled && !options.query_only;
        if !transfer_enabled {
            tracing::info!(
                run_id = %run_id,
                unique_studies = studies.len(),
                "Transfer phase disabled, stopping after query"
            );
        } else if !summary.interrupted {
            summary.transfer_phase_ran = true;
            self.transfer_studies(run_id, &association, studies, &mut summary)
                .await?;
        }

        summary = summary.with_duration(start_time.elapsed());
        log_phase!(run_id, RunPhase::Done.as_str());
        summary.log_summary();

        Ok(summary)
    }

    /// Query one category, record its audit row and return the parsed records
    async fn query_category(
        &self,
        run_id: Uuid,
        association: &Association,
        window: &BatchWindow,
        category: &str,
        summary: &mut RunSummary,
    ) -> Result<(CategoryOutcome, Vec<AttributeRecord>)> {
        let args = find_args(association, window, category, &self.return_tags);
        let started_at = Utc::now();

        log_phase!(run_id, RunPhase::QueryDispatched.as_str(), category = %category);
        let outcome = self
            .invoker
            .invoke(&self.config.protocol.find_command, &args, self.timeout())
            .await;
        self.write_raw_log(&self.config.protocol.find_command, category, started_at, &outcome)
            .await;

        let (status, records, error_detail) = if outcome.is_success() {
            let records = parse_responses(&outcome.combined_output);
            (AuditStatus::Success, records, None)
        } else {
            let detail = failure_detail(
                &self.config.protocol.find_command,
                &outcome,
                self.config.protocol.max_error_detail_chars,
            );
            tracing::warn!(
                run_id = %run_id,
                category = %category,
                error = %detail,
                "Query failed"
            );
            summary.add_error(
                RunError::new(RunErrorType::Query, detail.clone())
                    .with_context(format!("category={category}")),
            );
            (AuditStatus::Failure, Vec::new(), Some(detail))
        };

        let event = QueryAuditEvent {
            timestamp: started_at,
            endpoint: association.peer_endpoint(),
            query_level: QUERY_RETRIEVE_LEVEL.to_string(),
            start_date: window.start,
            end_date: window.end,
            category: category.to_string(),
            result_count: records.len(),
            duration_ms: outcome.duration_ms(),
            status,
            error_detail,
        };

        let query_id = self.recorder.record_query(&event).await.map_err(|e| {
            crate::log_error_with_context!(&e, "Failed to record query audit event");
            e
        })?;

        log_phase!(
            run_id,
            RunPhase::QueryAudited.as_str(),
            category = %category,
            query_id,
            status = %status,
            result_count = records.len()
        );

        Ok((
            CategoryOutcome {
                category: category.to_string(),
                status,
                result_count: records.len(),
                query_id,
                duration_ms: outcome.duration_ms(),
            },
            records,
        ))
    }

    /// Request a transfer per study with bounded concurrency
    ///
    /// Results are consumed in first-seen order. The first audit write
    /// failure stops the phase and is returned.
    async fn transfer_studies(
        &self,
        run_id: Uuid,
        association: &Association,
        studies: IndexMap<String, PendingTransfer>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let concurrency = self.config.protocol.max_concurrent_transfers.max(1);

        let mut results = stream::iter(studies.into_values())
            .map(|pending| self.transfer_study(run_id, association, pending))
            .buffered(concurrency);

        while let Some(result) = results.next().await {
            match result? {
                TransferResult::Succeeded => summary.transfers_succeeded += 1,
                TransferResult::Failed(error) => {
                    summary.transfers_failed += 1;
                    summary.add_error(error);
                }
                TransferResult::Skipped => {
                    if !summary.interrupted {
                        self.mark_interrupted(summary, "transfer phase");
                    }
                }
            }
        }

        Ok(())
    }

    async fn transfer_study(
        &self,
        run_id: Uuid,
        association: &Association,
        pending: PendingTransfer,
    ) -> Result<TransferResult> {
        if self.is_shutdown_requested() {
            return Ok(TransferResult::Skipped);
        }

        let uid = pending.uid.as_str();
        let move_command = &self.config.protocol.move_command;
        let args = move_args(
            association,
            self.config.protocol.move_destination.as_ref(),
            uid,
        );
        let started_at = Utc::now();

        log_phase!(run_id, RunPhase::TransferDispatched.as_str(), study_instance_uid = %uid);

        let outcome = if self.config.application.dry_run {
            tracing::info!(
                run_id = %run_id,
                study_instance_uid = %uid,
                command = %move_command,
                "DRY RUN: Would request transfer"
            );
            InvocationOutcome::success(String::new(), Duration::ZERO)
        } else {
            let outcome = self
                .invoker
                .invoke(move_command, &args, self.timeout())
                .await;
            self.write_raw_log(move_command, uid, started_at, &outcome)
                .await;
            outcome
        };

        let (status, error_detail) = if outcome.is_success() {
            (AuditStatus::Success, None)
        } else {
            (
                AuditStatus::Failure,
                Some(failure_detail(
                    move_command,
                    &outcome,
                    self.config.protocol.max_error_detail_chars,
                )),
            )
        };

        let event = TransferAuditEvent {
            timestamp: started_at,
            endpoint: association.peer_endpoint(),
            pending_count: count_pending_responses(&outcome.combined_output),
            duration_ms: outcome.duration_ms(),
            status,
            error_detail: error_detail.clone(),
            entity_key: uid.to_string(),
            query_id: Some(pending.query_id),
        };

        self.recorder.record_transfer(&event).await.map_err(|e| {
            crate::log_error_with_context!(&e, "Failed to record transfer audit event");
            e
        })?;

        log_phase!(
            run_id,
            RunPhase::TransferAudited.as_str(),
            study_instance_uid = %uid,
            status = %status,
            pending_count = event.pending_count
        );

        match error_detail {
            None => Ok(TransferResult::Succeeded),
            Some(detail) => {
                tracing::warn!(
                    run_id = %run_id,
                    study_instance_uid = %uid,
                    error = %detail,
                    "Transfer failed"
                );
                Ok(TransferResult::Failed(
                    RunError::new(RunErrorType::Transfer, detail)
                        .with_context(format!("study_instance_uid={uid}")),
                ))
            }
        }
    }

    async fn write_raw_log(
        &self,
        tool: &str,
        label: &str,
        started_at: chrono::DateTime<Utc>,
        outcome: &InvocationOutcome,
    ) {
        if let Some(writer) = &self.raw_logs {
            let tool_name = tool_file_stem(tool);
            writer
                .write(tool_name, label, started_at, &outcome.combined_output)
                .await;
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.protocol.timeout_seconds)
    }

    fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    fn mark_interrupted(&self, summary: &mut RunSummary, phase: &str) {
        tracing::warn!(run_id = %summary.run_id, phase, "Shutdown requested, stopping run");
        summary.interrupted = true;
        summary.add_error(RunError::new(
            RunErrorType::Interrupted,
            format!("Shutdown requested during {phase}"),
        ));
    }
}

/// Final path component of a tool command, used in raw log file names
fn tool_file_stem(command: &str) -> &str {
    std::path::Path::new(command)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(command)
}

/// Error detail for a failed invocation: the tail of its output
///
/// Output longer than `max_chars` keeps its last `max_chars` characters behind
/// a marker giving the number of leading characters dropped.
fn failure_detail(command: &str, outcome: &InvocationOutcome, max_chars: usize) -> String {
    let output = outcome.combined_output.trim();
    if output.is_empty() {
        return format!(
            "{} failed after {} ms without output",
            tool_file_stem(command),
            outcome.duration_ms()
        );
    }

    let char_count = output.chars().count();
    if char_count <= max_chars {
        return output.to_string();
    }

    let omitted = char_count - max_chars;
    let tail: String = output.chars().skip(omitted).collect();
    format!("[truncated: first {omitted} chars omitted]\n{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(RunPhase::WindowComputed.to_string(), "WINDOW_COMPUTED");
        assert_eq!(RunPhase::TransferAudited.as_str(), "TRANSFER_AUDITED");
    }

    #[test]
    fn test_tool_file_stem() {
        assert_eq!(tool_file_stem("/usr/local/bin/findscu"), "findscu");
        assert_eq!(tool_file_stem("movescu"), "movescu");
    }

    #[test]
    fn test_failure_detail_without_output() {
        let outcome = InvocationOutcome::failure("", Duration::from_millis(1500));
        assert_eq!(
            failure_detail("movescu", &outcome, 2000),
            "movescu failed after 1500 ms without output"
        );
    }

    #[test]
    fn test_failure_detail_keeps_tail() {
        let long = format!("{}E: Association Rejected", "x".repeat(5000));
        let outcome = InvocationOutcome::failure(long, Duration::ZERO);
        let detail = failure_detail("findscu", &outcome, 2000);

        let (marker, tail) = detail.split_once('\n').unwrap();
        assert_eq!(marker, "[truncated: first 3023 chars omitted]");
        assert_eq!(tail.chars().count(), 2000);
        assert!(tail.ends_with("E: Association Rejected"));
    }

    #[test]
    fn test_failure_detail_within_limit_is_untouched() {
        let outcome = InvocationOutcome::failure("E: Peer aborted Association\n", Duration::ZERO);
        assert_eq!(
            failure_detail("findscu", &outcome, 2000),
            "E: Peer aborted Association"
        );
        assert!(failure_detail("findscu", &outcome, 10).starts_with("[truncated: first 17 chars"));
    }
}
