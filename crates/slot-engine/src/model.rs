//! Engine inputs and outputs.
//!
//! Rules, exceptions and bookings are owned by external stores; the engine
//! reads immutable snapshots of them and never writes back.

use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::date_range::day_index;
use crate::error::{Result, SlotError};
use crate::interval::{Interval, Span};
use crate::time_of_day::TimeOfDay;

/// Identifier of a teacher account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeacherId(pub i64);

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn utc() -> String {
    "UTC".to_string()
}

fn yes() -> bool {
    true
}

/// A weekly-repeating availability template for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringAvailabilityRule {
    pub teacher_id: TeacherId,
    /// 0 = Monday … 6 = Sunday.
    pub day_of_week: u8,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// IANA zone the wall-clock `start`/`end` are expressed in.
    #[serde(default = "utc")]
    pub zone: String,
    #[serde(default = "yes")]
    pub active: bool,
}

impl RecurringAvailabilityRule {
    /// `None` when `start >= end`.
    pub fn span(&self) -> Option<Span<TimeOfDay>> {
        Span::new(self.start, self.end)
    }

    /// Whether this rule seeds availability on a day of `weekday`.
    pub fn applies_on(&self, weekday: Weekday) -> bool {
        self.active && self.day_of_week == day_index(weekday)
    }

    /// Write-time checks: weekday in range and `start < end`.
    pub fn validate(&self) -> Result<()> {
        if self.day_of_week > 6 {
            return Err(SlotError::InvalidWeekday(self.day_of_week));
        }
        if self.span().is_none() {
            return Err(SlotError::InvalidInterval {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(())
    }
}

/// A one-off override for a specific date.
///
/// Only `blocked` entries remove time. Non-blocking entries are accepted but
/// have no effect on the computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    #[serde(default = "yes")]
    pub blocked: bool,
    #[serde(default)]
    pub reason: Option<String>,
    /// Zone of the wall-clock times; the teacher's zone when absent.
    #[serde(default)]
    pub zone: Option<String>,
}

impl AvailabilityException {
    pub fn span(&self) -> Option<Span<TimeOfDay>> {
        Span::new(self.start, self.end)
    }
}

/// A committed session that consumes part of the available time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// Zone of the wall-clock times; the teacher's zone when absent.
    #[serde(default)]
    pub zone: Option<String>,
}

impl BookedInterval {
    pub fn span(&self) -> Option<Span<TimeOfDay>> {
        Span::new(self.start, self.end)
    }
}

/// Bookable windows on one date. Never constructed with an empty `slots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeDay {
    pub date: NaiveDate,
    pub slots: Vec<Interval>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(day_of_week: u8, start: &str, end: &str) -> RecurringAvailabilityRule {
        RecurringAvailabilityRule {
            teacher_id: TeacherId(1),
            day_of_week,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            zone: "UTC".to_string(),
            active: true,
        }
    }

    #[test]
    fn rule_applies_only_on_its_weekday_when_active() {
        let mut r = rule(0, "09:00", "12:00");
        assert!(r.applies_on(Weekday::Mon));
        assert!(!r.applies_on(Weekday::Tue));
        r.active = false;
        assert!(!r.applies_on(Weekday::Mon));
    }

    #[test]
    fn validate_rejects_bad_weekday_and_inverted_times() {
        assert!(rule(0, "09:00", "12:00").validate().is_ok());
        assert_eq!(
            rule(7, "09:00", "12:00").validate(),
            Err(SlotError::InvalidWeekday(7))
        );
        assert!(matches!(
            rule(0, "12:00", "09:00").validate(),
            Err(SlotError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"teacher_id": 4, "day_of_week": 1, "start": "09:00", "end": "10:30"}"#;
        let r: RecurringAvailabilityRule = serde_json::from_str(json).unwrap();
        assert_eq!(r.zone, "UTC");
        assert!(r.active);
        assert_eq!(r.teacher_id, TeacherId(4));

        let json = r#"{"teacher_id": 4, "date": "2026-03-17", "start": "09:00", "end": "10:00"}"#;
        let e: AvailabilityException = serde_json::from_str(json).unwrap();
        assert!(e.blocked);
        assert!(e.zone.is_none());
    }
}
