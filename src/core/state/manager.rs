//! State manager for watermark persistence
//!
//! This module provides the StateManager for reading the batch watermark and
//! advancing it after a successful run.

use crate::adapters::database::traits::WatermarkStore;
use crate::core::state::watermark::Watermark;
use crate::domain::{NmdoseError, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// State manager for watermark persistence
///
/// Only one batch run may read and later advance the watermark at a time;
/// scheduling runs so they never overlap is the caller's responsibility.
pub struct StateManager {
    /// Watermark storage backend
    storage: Arc<dyn WatermarkStore + Send + Sync>,
}

impl StateManager {
    /// Create a new StateManager with a storage backend
    ///
    /// # Arguments
    ///
    /// * `storage` - Watermark storage implementation
    pub fn new_with_storage(storage: Arc<dyn WatermarkStore + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Load the last processed date
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if no run has ever advanced the watermark.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load_last_processed_date(&self) -> Result<Option<NaiveDate>> {
        let date = self.storage.get_last_processed_date().await?;

        match date {
            Some(date) => tracing::debug!(last_processed_date = %date, "Watermark loaded"),
            None => tracing::debug!("No watermark found (first run)"),
        }

        Ok(date)
    }

    /// Advance the watermark to `date`
    ///
    /// Moving the watermark backwards is rejected: an earlier date would make
    /// the next window re-query days already processed.
    ///
    /// # Arguments
    ///
    /// * `date` - First date of the next window, the day after the completed one
    /// * `run_id` - Run that completed the window
    /// * `dry_run` - If true, skip the write
    ///
    /// # Errors
    ///
    /// Returns [`NmdoseError::State`] if `date` is before the current
    /// watermark, or the storage error if the write fails.
    pub async fn advance_watermark(
        &self,
        date: NaiveDate,
        run_id: Uuid,
        dry_run: bool,
    ) -> Result<()> {
        if let Some(current) = self.storage.get_last_processed_date().await? {
            if date < current {
                return Err(NmdoseError::State(format!(
                    "Refusing to move watermark backwards from {current} to {date}"
                )));
            }
        }

        tracing::info!(
            last_processed_date = %date,
            run_id = %run_id,
            dry_run,
            "Advancing watermark"
        );

        self.storage.record_processed_date(date, run_id, dry_run).await
    }

    /// Recent watermark rows, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn history(&self, limit: usize) -> Result<Vec<Watermark>> {
        self.storage.get_history(limit).await
    }
}
