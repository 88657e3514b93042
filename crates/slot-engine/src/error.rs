//! Error types for slot-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::TeacherId;

/// Every failure here is a deterministic function of the caller's input.
/// None of them are transient, so retrying the same call is pointless.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid range: end date {end} precedes start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid timezone: {0}")]
    TimezoneResolution(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid interval: start {start} is not before end {end}")]
    InvalidInterval { start: String, end: String },

    #[error("Invalid day of week: {0} (expected 0 = Monday ..= 6 = Sunday)")]
    InvalidWeekday(u8),

    #[error("Range too long: {days} days requested, at most {max} allowed")]
    RangeTooLong { days: u64, max: u64 },

    #[error("Teacher not found: {0}")]
    NotFound(TeacherId),
}

pub type Result<T> = std::result::Result<T, SlotError>;
