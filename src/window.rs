//! Date window and calendar-month helpers.

use crate::error::{EngineError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;

/// Inclusive `[start, end]` date range a projection is computed over.
///
/// Construction through [`DateWindow::new`] guarantees `start < end`, so
/// everything downstream can treat a window as already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(DateWindow { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns `true` if `date` falls inside the window, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Calendar months touched by the window, first to last, including
    /// partial months at either edge.
    pub fn months(&self) -> MonthIter {
        MonthIter {
            next: Some(MonthKey::of(self.start)),
            last: MonthKey::of(self.end),
        }
    }
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month, rolling over year boundaries.
    pub fn succ(self) -> Self {
        if self.month == 12 {
            MonthKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn days(self) -> Option<u32> {
        days_in_month(self.year, self.month)
    }

    /// Date of `day` in this month, clamped to the month's last day.
    pub fn clamped_day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day.min(self.days()?))
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days()?)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Iterator over the calendar months of a [`DateWindow`].
#[derive(Debug, Clone)]
pub struct MonthIter {
    next: Option<MonthKey>,
    last: MonthKey,
}

impl Iterator for MonthIter {
    type Item = MonthKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.last {
            Some(current.succ())
        } else {
            None
        };
        Some(current)
    }
}

/// Number of days in `month` of `year`, leap years included.
///
/// Returns `None` for a month outside `1..=12` or a year chrono cannot
/// represent.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(s.trim().to_string()))
}
