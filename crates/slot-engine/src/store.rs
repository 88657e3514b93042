//! Read-only ports onto the stores that own teachers, rules, exceptions and
//! sessions, plus an in-memory implementation backed by a JSON snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{AvailabilityException, BookedInterval, RecurringAvailabilityRule, TeacherId};

/// Teacher lookup. `None` means the teacher does not exist.
pub trait TeacherDirectory {
    /// The teacher's stored IANA zone.
    fn teacher_zone(&self, teacher_id: TeacherId) -> Option<String>;
}

pub trait AvailabilityRuleStore {
    /// Active recurring rules for a teacher.
    fn active_rules(&self, teacher_id: TeacherId) -> Vec<RecurringAvailabilityRule>;
}

pub trait ExceptionStore {
    /// Date-specific overrides dated within `[start, end]`.
    fn exceptions(
        &self,
        teacher_id: TeacherId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<AvailabilityException>;
}

pub trait SessionStore {
    /// Committed sessions dated within `[start, end]`.
    fn booked(
        &self,
        teacher_id: TeacherId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<BookedInterval>;
}

/// Everything the query service reads.
pub trait SlotStore: TeacherDirectory + AvailabilityRuleStore + ExceptionStore + SessionStore {}

impl<T> SlotStore for T where
    T: TeacherDirectory + AvailabilityRuleStore + ExceptionStore + SessionStore
{
}

/// A teacher account as far as scheduling is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub id: TeacherId,
    #[serde(default = "default_zone")]
    pub zone: String,
}

fn default_zone() -> String {
    "UTC".to_string()
}

/// Snapshot store held entirely in memory.
///
/// Deserializes from `{"teachers": [...], "rules": [...], "exceptions":
/// [...], "bookings": [...]}`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryStore {
    #[serde(default)]
    pub teachers: Vec<TeacherRecord>,
    #[serde(default)]
    pub rules: Vec<RecurringAvailabilityRule>,
    #[serde(default)]
    pub exceptions: Vec<AvailabilityException>,
    #[serde(default)]
    pub bookings: Vec<BookedInterval>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Register a teacher, replacing the stored zone if it already exists.
    pub fn add_teacher(&mut self, id: TeacherId, zone: impl Into<String>) {
        let zone = zone.into();
        match self.teachers.iter_mut().find(|t| t.id == id) {
            Some(existing) => existing.zone = zone,
            None => self.teachers.push(TeacherRecord { id, zone }),
        }
    }

    /// Insert a rule, enforcing `start < end` and a valid weekday.
    pub fn add_rule(&mut self, rule: RecurringAvailabilityRule) -> Result<()> {
        rule.validate()?;
        self.rules.push(rule);
        Ok(())
    }

    pub fn add_exception(&mut self, exception: AvailabilityException) {
        self.exceptions.push(exception);
    }

    pub fn add_booking(&mut self, booking: BookedInterval) {
        self.bookings.push(booking);
    }
}

impl TeacherDirectory for InMemoryStore {
    fn teacher_zone(&self, teacher_id: TeacherId) -> Option<String> {
        self.teachers
            .iter()
            .find(|t| t.id == teacher_id)
            .map(|t| t.zone.clone())
    }
}

impl AvailabilityRuleStore for InMemoryStore {
    fn active_rules(&self, teacher_id: TeacherId) -> Vec<RecurringAvailabilityRule> {
        self.rules
            .iter()
            .filter(|r| r.teacher_id == teacher_id && r.active)
            .cloned()
            .collect()
    }
}

impl ExceptionStore for InMemoryStore {
    fn exceptions(
        &self,
        teacher_id: TeacherId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<AvailabilityException> {
        self.exceptions
            .iter()
            .filter(|e| e.teacher_id == teacher_id && start <= e.date && e.date <= end)
            .cloned()
            .collect()
    }
}

impl SessionStore for InMemoryStore {
    fn booked(
        &self,
        teacher_id: TeacherId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<BookedInterval> {
        self.bookings
            .iter()
            .filter(|b| b.teacher_id == teacher_id && start <= b.date && b.date <= end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn booking(teacher: i64, date: NaiveDate) -> BookedInterval {
        BookedInterval {
            teacher_id: TeacherId(teacher),
            date,
            start: "10:00".parse().unwrap(),
            end: "11:00".parse().unwrap(),
            zone: None,
        }
    }

    #[test]
    fn add_rule_enforces_start_before_end() {
        let mut store = InMemoryStore::new();
        let rule = RecurringAvailabilityRule {
            teacher_id: TeacherId(1),
            day_of_week: 0,
            start: "12:00".parse().unwrap(),
            end: "12:00".parse().unwrap(),
            zone: "UTC".to_string(),
            active: true,
        };
        assert!(matches!(
            store.add_rule(rule),
            Err(SlotError::InvalidInterval { .. })
        ));
        assert!(store.rules.is_empty());
    }

    #[test]
    fn inactive_rules_are_not_returned() {
        let mut store = InMemoryStore::new();
        for active in [true, false] {
            store
                .add_rule(RecurringAvailabilityRule {
                    teacher_id: TeacherId(1),
                    day_of_week: 2,
                    start: "09:00".parse().unwrap(),
                    end: "10:00".parse().unwrap(),
                    zone: "UTC".to_string(),
                    active,
                })
                .unwrap();
        }
        assert_eq!(store.active_rules(TeacherId(1)).len(), 1);
        assert!(store.active_rules(TeacherId(2)).is_empty());
    }

    #[test]
    fn booked_filters_by_teacher_and_inclusive_dates() {
        let mut store = InMemoryStore::new();
        store.add_booking(booking(1, d(2026, 3, 15)));
        store.add_booking(booking(1, d(2026, 3, 16)));
        store.add_booking(booking(1, d(2026, 3, 18)));
        store.add_booking(booking(1, d(2026, 3, 19)));
        store.add_booking(booking(2, d(2026, 3, 17)));

        let found = store.booked(TeacherId(1), d(2026, 3, 16), d(2026, 3, 18));
        let dates: Vec<NaiveDate> = found.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![d(2026, 3, 16), d(2026, 3, 18)]);
    }

    #[test]
    fn add_teacher_replaces_zone() {
        let mut store = InMemoryStore::new();
        store.add_teacher(TeacherId(9), "UTC");
        store.add_teacher(TeacherId(9), "Asia/Tokyo");
        assert_eq!(store.teachers.len(), 1);
        assert_eq!(store.teacher_zone(TeacherId(9)).as_deref(), Some("Asia/Tokyo"));
        assert_eq!(store.teacher_zone(TeacherId(10)), None);
    }

    #[test]
    fn snapshot_keys_are_optional() {
        let store = InMemoryStore::from_json(r#"{"teachers": [{"id": 3}]}"#).unwrap();
        assert_eq!(store.teacher_zone(TeacherId(3)).as_deref(), Some("UTC"));
        assert!(store.rules.is_empty());
    }
}
