//! The free-slot query endpoint.
//!
//! Validates a [`SlotQuery`], looks the teacher up, fetches the three input
//! collections from the stores and hands them to the [`FreeSlotEngine`].

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::dst::DstPolicy;
use crate::engine::{FreeSlotEngine, RULE_DATE_REACH};
use crate::error::{Result, SlotError};
use crate::model::{FreeDay, TeacherId};
use crate::store::SlotStore;
use crate::zone::resolve_zone;

/// Default cap on the number of days one query may span.
pub const DEFAULT_MAX_SPAN_DAYS: u64 = 366;

/// A request for a teacher's free windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    pub teacher_id: TeacherId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Display zone. Falls back to the teacher's stored zone.
    #[serde(default)]
    pub tz: Option<String>,
}

/// Bounds on the work a single query may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Maximum inclusive day count of `[start, end]`.
    pub max_span_days: u64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDto {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDto {
    pub date: NaiveDate,
    pub slots: Vec<SlotDto>,
}

impl From<&FreeDay> for DayDto {
    fn from(day: &FreeDay) -> Self {
        Self {
            date: day.date,
            slots: day
                .slots
                .iter()
                .map(|s| SlotDto {
                    start: s.start().to_string(),
                    end: s.end().to_string(),
                })
                .collect(),
        }
    }
}

/// Response body: free windows per date plus the effective zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlotsResponse {
    pub teacher_id: TeacherId,
    pub timezone: String,
    pub days: Vec<DayDto>,
}

/// Serves [`SlotQuery`]s against a store.
#[derive(Debug, Clone)]
pub struct AvailabilityService<S> {
    store: S,
    limits: QueryLimits,
    dst_policy: DstPolicy,
}

impl<S: SlotStore> AvailabilityService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            limits: QueryLimits::default(),
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Answer a query.
    ///
    /// # Errors
    /// [`SlotError::InvalidRange`], [`SlotError::RangeTooLong`],
    /// [`SlotError::NotFound`] for an unknown teacher, and
    /// [`SlotError::TimezoneResolution`] for an unusable zone.
    pub fn free_slots(&self, query: &SlotQuery) -> Result<FreeSlotsResponse> {
        if query.end < query.start {
            return Err(SlotError::InvalidRange {
                start: query.start,
                end: query.end,
            });
        }
        let days = DateRange::day_count(query.start, query.end);
        if days > self.limits.max_span_days {
            return Err(SlotError::RangeTooLong {
                days,
                max: self.limits.max_span_days,
            });
        }

        let teacher_zone = self
            .store
            .teacher_zone(query.teacher_id)
            .ok_or(SlotError::NotFound(query.teacher_id))?;
        let assumed = resolve_zone(&teacher_zone)?;
        let display = match query.tz.as_deref().map(str::trim) {
            Some(tz) if !tz.is_empty() => resolve_zone(tz)?,
            _ => assumed,
        };

        let zone_name = display.name();
        tracing::debug!(
            teacher = %query.teacher_id,
            start = %query.start,
            end = %query.end,
            zone = %zone_name,
            "serving free-slot query"
        );

        // Inputs dated up to RULE_DATE_REACH days either side can reach into
        // the range once zones are reconciled.
        let reach = TimeDelta::days(RULE_DATE_REACH);
        let fetch_start = query.start.checked_sub_signed(reach).unwrap_or(NaiveDate::MIN);
        let fetch_end = query.end.checked_add_signed(reach).unwrap_or(NaiveDate::MAX);

        let rules = self.store.active_rules(query.teacher_id);
        let exceptions = self
            .store
            .exceptions(query.teacher_id, fetch_start, fetch_end);
        let bookings = self.store.booked(query.teacher_id, fetch_start, fetch_end);

        let engine = FreeSlotEngine::new()
            .with_assumed_zone(assumed)
            .with_dst_policy(self.dst_policy);
        let free_days = engine.compute(
            query.teacher_id,
            query.start,
            query.end,
            &rules,
            &exceptions,
            &bookings,
            display.name(),
        )?;

        Ok(FreeSlotsResponse {
            teacher_id: query.teacher_id,
            timezone: display.name().to_string(),
            days: free_days.iter().map(DayDto::from).collect(),
        })
    }
}
