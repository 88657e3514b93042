//! Inclusive calendar-date iteration.
//!
//! Iterates calendar days, not instants: no timezone is involved and every
//! date appears exactly once regardless of DST.

use chrono::{Datelike, NaiveDate, Weekday};

/// Every date from `start` to `end` inclusive, each tagged with its weekday.
///
/// Empty when `end < start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    front: NaiveDate,
    back: NaiveDate,
    remaining: u64,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            front: start,
            back: end,
            remaining: Self::day_count(start, end),
        }
    }

    /// Number of dates in `[start, end]`, zero when `end < start`.
    pub fn day_count(start: NaiveDate, end: NaiveDate) -> u64 {
        let days = end.signed_duration_since(start).num_days();
        u64::try_from(days).map_or(0, |d| d + 1)
    }
}

impl Iterator for DateRange {
    type Item = (NaiveDate, Weekday);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let date = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            match date.succ_opt() {
                Some(next) => self.front = next,
                None => self.remaining = 0,
            }
        }
        Some((date, date.weekday()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

impl DoubleEndedIterator for DateRange {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let date = self.back;
        self.remaining -= 1;
        if self.remaining > 0 {
            match date.pred_opt() {
                Some(prev) => self.back = prev,
                None => self.remaining = 0,
            }
        }
        Some((date, date.weekday()))
    }
}

impl ExactSizeIterator for DateRange {}

impl std::iter::FusedIterator for DateRange {}

/// Weekday index with Monday = 0 … Sunday = 6, the numbering recurring
/// rules use.
pub fn day_index(weekday: Weekday) -> u8 {
    // num_days_from_monday is always < 7.
    weekday.num_days_from_monday() as u8
}
