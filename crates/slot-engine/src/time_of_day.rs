//! Wall-clock time of day with a total order.
//!
//! Stored as whole seconds since local midnight. Valid values are
//! `00:00:00 ..= 23:59:59` plus one sentinel, [`TimeOfDay::END_OF_DAY`]
//! (`24:00:00`), which only ever appears as the exclusive end of a window that
//! runs up to the following midnight.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

const SECONDS_PER_DAY: u32 = 86_400;

/// A comparable `hour:minute:second` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    secs: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { secs: 0 };

    /// `24:00:00`, the exclusive end of a window reaching the next midnight.
    pub const END_OF_DAY: TimeOfDay = TimeOfDay {
        secs: SECONDS_PER_DAY,
    };

    /// Build a time of day, rejecting anything outside `0 ≤ hour < 24`,
    /// `0 ≤ minute, second < 60`.
    pub fn new(hour: u32, minute: u32, second: u32) -> Result<Self> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(SlotError::InvalidTime(format!(
                "{:02}:{:02}:{:02}",
                hour, minute, second
            )));
        }
        Ok(Self {
            secs: hour * 3600 + minute * 60 + second,
        })
    }

    /// Shorthand for `new(hour, minute, 0)`.
    pub fn hm(hour: u32, minute: u32) -> Result<Self> {
        Self::new(hour, minute, 0)
    }

    pub fn hour(&self) -> u32 {
        self.secs / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.secs / 60) % 60
    }

    pub fn second(&self) -> u32 {
        self.secs % 60
    }

    pub fn seconds_from_midnight(&self) -> u32 {
        self.secs
    }

    pub fn is_end_of_day(&self) -> bool {
        self.secs == SECONDS_PER_DAY
    }

    /// The local datetime this wall-clock value denotes on `date`.
    ///
    /// `END_OF_DAY` maps to midnight of the following day. Returns `None` only
    /// when that would overflow chrono's calendar.
    pub fn on(self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_time(NaiveTime::MIN)
            .checked_add_signed(TimeDelta::seconds(i64::from(self.secs)))
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        // Leap-second nanoseconds are dropped; the value stays below 24:00.
        Self {
            secs: t.num_seconds_from_midnight(),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl FromStr for TimeOfDay {
    type Err = SlotError;

    /// Parse `HH:MM` or `HH:MM:SS`. `24:00` and `24:00:00` parse to
    /// [`TimeOfDay::END_OF_DAY`].
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SlotError::InvalidTime(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }

        let mut fields = [0u32; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let [hour, minute, second] = fields;
        if hour == 24 && minute == 0 && second == 0 {
            return Ok(Self::END_OF_DAY);
        }
        Self::new(hour, minute, second).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(TimeOfDay::new(24, 0, 0).is_err());
        assert!(TimeOfDay::new(9, 60, 0).is_err());
        assert!(TimeOfDay::new(9, 0, 60).is_err());
        assert!(TimeOfDay::new(23, 59, 59).is_ok());
    }

    #[test]
    fn orders_numerically() {
        let a = TimeOfDay::hm(9, 30).unwrap();
        let b = TimeOfDay::hm(10, 0).unwrap();
        assert!(a < b);
        assert!(b < TimeOfDay::END_OF_DAY);
        assert!(TimeOfDay::MIDNIGHT < a);
    }

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!("09:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::hm(9, 0).unwrap());
        assert_eq!(
            "13:45:10".parse::<TimeOfDay>().unwrap(),
            TimeOfDay::new(13, 45, 10).unwrap()
        );
        assert_eq!("24:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::END_OF_DAY);
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["", "9", "09:", "aa:bb", "25:00", "24:00:01", "09:00:00:00", "+9:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn displays_as_hh_mm_ss() {
        assert_eq!(TimeOfDay::hm(7, 5).unwrap().to_string(), "07:05:00");
        assert_eq!(TimeOfDay::END_OF_DAY.to_string(), "24:00:00");
    }

    #[test]
    fn end_of_day_lands_on_next_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        let next = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        assert_eq!(
            TimeOfDay::END_OF_DAY.on(date).unwrap(),
            next.and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn serde_uses_string_form() {
        let t = TimeOfDay::hm(11, 30).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"11:30:00\"");
        let back: TimeOfDay = serde_json::from_str("\"11:30\"").unwrap();
        assert_eq!(back, t);
    }
}
