//! Batch window calculation
//!
//! Computes the `[start, end]` study-date range queried by a batch run from the
//! configured batch start, the batch length, the daily cutover date and the
//! persisted watermark. The calculation is pure: it never reads or writes state.

use crate::domain::{NmdoseError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used in protocol date-range tokens
pub const DATE_TOKEN_FORMAT: &str = "%Y%m%d";

/// An inclusive study-date range
///
/// A window whose `start` lies after its `end` is empty: the watermark is
/// past the daily cutover and there is nothing left to query.
///
/// # Examples
///
/// ```
/// use nmdose::core::window::compute_window;
/// use chrono::NaiveDate;
///
/// let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
/// let window = compute_window(d("2022-01-01"), 3, d("2022-01-10"), Some(d("2022-01-02")));
///
/// assert_eq!(window.format_token(), "20220102-20220104");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWindow {
    /// First study date included in the window
    pub start: NaiveDate,

    /// Last study date included in the window
    pub end: NaiveDate,
}

impl BatchWindow {
    /// Create a window from its bounds
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether the window contains no dates (`start > end`)
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of days covered, zero for an empty window
    pub fn days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    /// Date the following window resumes from once this one is processed
    ///
    /// This is the value persisted as the watermark after a successful run,
    /// so consecutive windows never share a day.
    pub fn resume_date(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(NaiveDate::MAX)
    }

    /// Format as `YYYYMMDD-YYYYMMDD` for the protocol date-range key
    pub fn format_token(&self) -> String {
        format!(
            "{}-{}",
            self.start.format(DATE_TOKEN_FORMAT),
            self.end.format(DATE_TOKEN_FORMAT)
        )
    }

    /// Parse a `YYYYMMDD-YYYYMMDD` token back into a window
    ///
    /// # Errors
    ///
    /// Returns [`NmdoseError::Parse`] if the token does not have exactly two
    /// hyphen-separated 8-digit dates.
    pub fn parse(token: &str) -> Result<Self> {
        let (start, end) = token
            .trim()
            .split_once('-')
            .ok_or_else(|| NmdoseError::Parse(format!("Invalid date range '{token}'")))?;

        let parse_date = |part: &str| {
            if part.len() != 8 {
                return Err(NmdoseError::Parse(format!(
                    "Invalid date '{part}' in range '{token}'"
                )));
            }
            NaiveDate::parse_from_str(part, DATE_TOKEN_FORMAT).map_err(|e| {
                NmdoseError::Parse(format!("Invalid date '{part}' in range '{token}': {e}"))
            })
        };

        Ok(Self::new(parse_date(start)?, parse_date(end)?))
    }
}

impl fmt::Display for BatchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Compute the batch window for the next run
///
/// The run resumes from the watermark when it is at or after the configured
/// start, otherwise from the configured start. The window spans
/// `batch_length_days` days and is clamped so it never crosses
/// `daily_cutover_date`. A `batch_length_days` of zero is treated as one.
///
/// When the effective start already lies past the cutover the returned window
/// is empty; see [`BatchWindow::is_empty`].
pub fn compute_window(
    configured_start: NaiveDate,
    batch_length_days: u32,
    daily_cutover_date: NaiveDate,
    last_watermark: Option<NaiveDate>,
) -> BatchWindow {
    let effective_start = match last_watermark {
        Some(watermark) if watermark >= configured_start => watermark,
        _ => configured_start,
    };

    let span = i64::from(batch_length_days.max(1)) - 1;
    let candidate_end = effective_start
        .checked_add_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MAX);

    let effective_end = if candidate_end >= daily_cutover_date {
        daily_cutover_date
    } else {
        candidate_end
    };

    BatchWindow::new(effective_start, effective_end)
}
