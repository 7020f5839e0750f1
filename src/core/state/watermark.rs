//! Watermark model for tracking batch progress
//!
//! A watermark row records that every study date before `last_processed_date`
//! has been queried and transferred, the last of them by the run identified by
//! `run_id`. The next window starts on `last_processed_date` itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded watermark advancement
///
/// # Examples
///
/// ```
/// use nmdose::core::state::watermark::Watermark;
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let date = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
/// let watermark = Watermark::new(date, Some(Uuid::new_v4()));
///
/// assert_eq!(watermark.last_processed_date, date);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Day after the last study date covered by a successful run
    pub last_processed_date: NaiveDate,

    /// When the advancement was recorded
    pub recorded_at: DateTime<Utc>,

    /// Run that advanced the watermark; absent for rows seeded by hand
    pub run_id: Option<Uuid>,
}

impl Watermark {
    /// Create a watermark recorded now
    pub fn new(last_processed_date: NaiveDate, run_id: Option<Uuid>) -> Self {
        Self {
            last_processed_date,
            recorded_at: Utc::now(),
            run_id,
        }
    }

    /// Age of this row relative to now
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.recorded_at
    }
}
