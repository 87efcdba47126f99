use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("end date {end} is in the future (now is {now})")]
    EndInFuture {
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

/// The span of days to acquire for one source.
///
/// Construction enforces `start <= end <= now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    source_id: String,
}

impl AcquisitionWindow {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source_id: impl Into<String>,
    ) -> Result<Self, RangeError> {
        Self::new_at(start, end, source_id, Utc::now())
    }

    /// Same as [`AcquisitionWindow::new`] but checks `end` against an explicit clock.
    pub fn new_at(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        if end > now {
            return Err(RangeError::EndInFuture { end, now });
        }

        Ok(Self {
            start,
            end,
            source_id: source_id.into(),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Day-start timestamps covered by the window, end exclusive.
    pub fn days(&self) -> DateRange {
        DateRange::from_bounds(self.start, self.end)
    }
}

/// Lazy sequence of day starts `start, start+1d, ..., end-1d`.
///
/// Holds only its bounds, so cloning it (or calling [`AcquisitionWindow::days`]
/// again) restarts the sequence from the first day.
#[derive(Debug, Clone)]
pub struct DateRange {
    start: DateTime<Utc>,
    count: i64,
    next: i64,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        Self::new_at(start, end, Utc::now())
    }

    pub fn new_at(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        if end > now {
            return Err(RangeError::EndInFuture { end, now });
        }
        Ok(Self::from_bounds(start, end))
    }

    fn from_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        // Partial trailing days are not yielded
        let count = (end - start).num_days().max(0);
        Self {
            start,
            count,
            next: 0,
        }
    }

    /// Total number of days in the range, independent of iteration progress.
    pub fn day_count(&self) -> usize {
        self.count as usize
    }
}

impl Iterator for DateRange {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let day = self.start + Duration::days(self.next);
        self.next += 1;
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateRange {}
