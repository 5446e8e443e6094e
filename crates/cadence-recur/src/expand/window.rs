//! Half-open date windows used to bound every expansion.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::error::{RecurError, RecurResult};

/// Calendar-date window `[start, end)` in facility-local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// ## Summary
    /// Creates a window covering `start` up to but excluding `end`.
    ///
    /// An equal start and end is a valid, empty window.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidRange` if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> RecurResult<Self> {
        if end < start {
            return Err(RecurError::InvalidRange(format!(
                "window end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// ## Summary
    /// Creates the window covering one calendar month.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidRange` if the year/month pair is not a real month.
    pub fn month(year: i32, month: u32) -> RecurResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            RecurError::InvalidRange(format!("{year}-{month:02} is not a valid month"))
        })?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(|| RecurError::InvalidRange(format!("{year}-{month:02} is out of range")))?;
        Ok(Self { start, end })
    }

    /// Creates the window covering exactly one date.
    #[must_use]
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date.succ_opt().unwrap_or(date),
        }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end of the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of dates in the window.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Iterates over every date in the window.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day < end)
    }
}
