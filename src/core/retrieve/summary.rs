//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the result of one
//! batch run.

use crate::core::audit::events::AuditStatus;
use crate::core::window::BatchWindow;
use chrono::NaiveDate;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of querying one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutcome {
    pub category: String,

    pub status: AuditStatus,

    /// Response blocks parsed from the tool output
    pub result_count: usize,

    /// Identifier of the query audit row
    pub query_id: i64,

    pub duration_ms: u64,
}

/// Summary of a batch run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier shared by every log event of the run
    pub run_id: Uuid,

    /// Window queried, or `None` when the schedule is caught up
    pub window: Option<BatchWindow>,

    /// One entry per category, in query order
    pub categories: Vec<CategoryOutcome>,

    /// Distinct studies after deduplication
    pub unique_studies: usize,

    /// Records dropped for a missing or invalid study instance UID
    pub discarded_records: usize,

    /// Typed field conversion failures across all kept records
    pub field_errors: usize,

    /// Whether the transfer phase ran
    pub transfer_phase_ran: bool,

    pub transfers_succeeded: usize,

    pub transfers_failed: usize,

    /// Whether the run stopped early on a shutdown signal
    pub interrupted: bool,

    pub duration: Duration,

    pub errors: Vec<RunError>,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            window: None,
            categories: Vec::new(),
            unique_studies: 0,
            discarded_records: 0,
            field_errors: 0,
            transfer_phase_ran: false,
            transfers_succeeded: 0,
            transfers_failed: 0,
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Whether there was nothing to query
    pub fn is_caught_up(&self) -> bool {
        self.window.is_none()
    }

    pub fn failed_queries(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| !c.status.is_success())
            .count()
    }

    pub fn transfers_attempted(&self) -> usize {
        self.transfers_succeeded + self.transfers_failed
    }

    /// Check if the run was successful (every query and transfer succeeded)
    pub fn is_successful(&self) -> bool {
        !self.interrupted
            && self.failed_queries() == 0
            && self.transfers_failed == 0
            && self.errors.is_empty()
    }

    /// Whether the caller may advance the watermark past the window
    ///
    /// Requires a fully successful run over a non-empty window that went
    /// through the transfer phase.
    pub fn can_advance_watermark(&self) -> bool {
        self.window.is_some() && self.transfer_phase_ran && self.is_successful()
    }

    /// Watermark to persist after this run, if it may advance
    ///
    /// The stored date is the first day of the next window, i.e. the day
    /// after the processed window ends.
    pub fn next_watermark(&self) -> Option<NaiveDate> {
        if !self.can_advance_watermark() {
            return None;
        }
        self.window.map(|w| w.resume_date())
    }

    /// Log the summary
    pub fn log_summary(&self) {
        let window = self
            .window
            .map(|w| w.format_token())
            .unwrap_or_else(|| "caught up".to_string());

        tracing::info!(
            run_id = %self.run_id,
            window = %window,
            categories = self.categories.len(),
            failed_queries = self.failed_queries(),
            unique_studies = self.unique_studies,
            discarded_records = self.discarded_records,
            field_errors = self.field_errors,
            transfers_succeeded = self.transfers_succeeded,
            transfers_failed = self.transfers_failed,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Run completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                run_id = %self.run_id,
                error_count = self.errors.len(),
                "Run completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Run error"
                );
            }
        }
    }
}

/// Type of run error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunErrorType {
    /// Query tool failed or timed out
    Query,
    /// Transfer tool failed or timed out
    Transfer,
    /// Run stopped before all work was done
    Interrupted,
}

/// Run error with context
#[derive(Debug, Clone)]
pub struct RunError {
    pub error_type: RunErrorType,

    pub message: String,

    /// Optional context (e.g., category, study instance UID)
    pub context: Option<String>,
}

impl RunError {
    /// Create a new run error
    pub fn new(error_type: RunErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}
