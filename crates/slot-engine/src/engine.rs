//! Free-slot computation.
//!
//! For every date in the requested range the engine seeds an
//! [`IntervalSet`] from the matching weekly rules, subtracts blocking
//! exceptions, subtracts bookings, and emits whatever is left.
//!
//! Inputs may be expressed in different zones. Everything is normalized to
//! UTC first, the algebra runs one display-zone day at a time, and the
//! residue is converted back to the display zone's wall-clock. When all
//! zones agree this reduces to plain per-date wall-clock subtraction.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::date_range::{day_index, DateRange};
use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};
use crate::interval::{IntervalSet, Span};
use crate::model::{
    AvailabilityException, BookedInterval, FreeDay, RecurringAvailabilityRule, TeacherId,
};
use crate::time_of_day::TimeOfDay;
use crate::zone::{self, UtcSpan};

/// Rule-local dates on either side of a display date that can reach into it.
/// UTC offsets differ by at most 26 hours.
pub(crate) const RULE_DATE_REACH: i64 = 2;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Zone given to exceptions and bookings that do not declare one.
    pub assumed_zone: String,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assumed_zone: "UTC".to_string(),
            dst_policy: DstPolicy::default(),
        }
    }
}

/// Pure, synchronous free-slot calculator. Holds no state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeSlotEngine {
    assumed_zone: Tz,
    dst_policy: DstPolicy,
}

impl Default for FreeSlotEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// A rule that passed validation, with its zone resolved.
struct ZonedRule {
    day_of_week: u8,
    span: Span<TimeOfDay>,
    zone: Tz,
}

impl FreeSlotEngine {
    pub fn new() -> Self {
        Self {
            assumed_zone: chrono_tz::UTC,
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            assumed_zone: zone::resolve_zone(&config.assumed_zone)?,
            dst_policy: config.dst_policy,
        })
    }

    pub fn with_assumed_zone(mut self, zone: Tz) -> Self {
        self.assumed_zone = zone;
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn assumed_zone(&self) -> Tz {
        self.assumed_zone
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    /// Compute the bookable windows for `teacher_id` on every date in
    /// `[start_date, end_date]`, expressed in `display_zone`.
    ///
    /// Dates with no remaining time are omitted. Days come back in ascending
    /// order and each day's slots are in normal form.
    ///
    /// # Errors
    /// - [`SlotError::InvalidRange`] if `end_date < start_date`.
    /// - [`SlotError::TimezoneResolution`] if `display_zone`, or the zone of
    ///   any relevant input, is not an IANA identifier.
    ///
    /// Nothing is returned on error.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        teacher_id: TeacherId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rules: &[RecurringAvailabilityRule],
        exceptions: &[AvailabilityException],
        bookings: &[BookedInterval],
        display_zone: &str,
    ) -> Result<Vec<FreeDay>> {
        if end_date < start_date {
            return Err(SlotError::InvalidRange {
                start: start_date,
                end: end_date,
            });
        }
        let display = zone::resolve_zone(display_zone)?;

        let zone_name = display.name();
        let _span = tracing::debug_span!(
            "compute",
            teacher = %teacher_id,
            start = %start_date,
            end = %end_date,
            zone = %zone_name,
        )
        .entered();

        let rules = self.normalize_rules(teacher_id, rules)?;
        if rules.is_empty() {
            tracing::debug!("no active rules, nothing to compute");
            return Ok(Vec::new());
        }
        let blocked = self.normalize_exceptions(teacher_id, exceptions)?;
        let booked = self.normalize_bookings(teacher_id, bookings)?;

        let mut days = Vec::new();
        for (date, _) in DateRange::new(start_date, end_date) {
            if let Some(day) = self.free_day(date, display, &rules, &blocked, &booked) {
                days.push(day);
            }
        }

        tracing::debug!(free_days = days.len(), "computed free slots");
        Ok(days)
    }

    fn free_day(
        &self,
        date: NaiveDate,
        display: Tz,
        rules: &[ZonedRule],
        blocked: &[UtcSpan],
        booked: &[UtcSpan],
    ) -> Option<FreeDay> {
        let window = zone::day_window(display, date)?;

        let seed = IntervalSet::from_spans(self.rule_spans(rules, &window, date));
        if seed.is_empty() {
            return None;
        }

        let working = seed.subtract(&overlapping(blocked, &window));
        let free = working.subtract(&overlapping(booked, &window));
        if free.is_empty() {
            return None;
        }

        let local = IntervalSet::from_spans(
            free.iter()
                .flat_map(|span| zone::utc_span_to_local(display, date, &window, span)),
        );
        if local.is_empty() {
            return None;
        }

        Some(FreeDay {
            date,
            slots: local.to_intervals(date),
        })
    }

    /// Occurrences of every rule that fall inside `window`, clipped to it.
    fn rule_spans(
        &self,
        rules: &[ZonedRule],
        window: &UtcSpan,
        date: NaiveDate,
    ) -> Vec<UtcSpan> {
        let mut spans = Vec::new();
        for offset in -RULE_DATE_REACH..=RULE_DATE_REACH {
            let Some(local_date) = date.checked_add_signed(TimeDelta::days(offset)) else {
                continue;
            };
            let weekday = day_index(local_date.weekday());
            for rule in rules.iter().filter(|r| r.day_of_week == weekday) {
                let Some(occurrence) =
                    zone::local_span_to_utc(rule.zone, local_date, rule.span, self.dst_policy)
                else {
                    tracing::warn!(
                        date = %local_date,
                        start = %rule.span.start(),
                        end = %rule.span.end(),
                        zone = %rule.zone.name(),
                        "rule window skipped by DST policy"
                    );
                    continue;
                };
                spans.extend(occurrence.intersect(window));
            }
        }
        spans
    }

    fn normalize_rules(
        &self,
        teacher_id: TeacherId,
        rules: &[RecurringAvailabilityRule],
    ) -> Result<Vec<ZonedRule>> {
        let mut zoned = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.teacher_id != teacher_id || !rule.active {
                continue;
            }
            if let Err(err) = rule.validate() {
                tracing::warn!(teacher = %teacher_id, error = %err, "dropping invalid rule");
                continue;
            }
            let Some(span) = rule.span() else { continue };
            zoned.push(ZonedRule {
                day_of_week: rule.day_of_week,
                span,
                zone: zone::resolve_zone(&rule.zone)?,
            });
        }
        Ok(zoned)
    }

    fn normalize_exceptions(
        &self,
        teacher_id: TeacherId,
        exceptions: &[AvailabilityException],
    ) -> Result<Vec<UtcSpan>> {
        let mut spans = Vec::new();
        let mut ignored = 0usize;
        for exception in exceptions.iter().filter(|e| e.teacher_id == teacher_id) {
            if !exception.blocked {
                ignored += 1;
                continue;
            }
            let Some(span) = exception.span() else {
                tracing::warn!(
                    teacher = %teacher_id,
                    date = %exception.date,
                    start = %exception.start,
                    end = %exception.end,
                    "dropping exception with empty or inverted window"
                );
                continue;
            };
            let tz = self.zone_or_assumed(exception.zone.as_deref())?;
            spans.extend(blocker_to_utc(tz, exception.date, span));
        }
        if ignored > 0 {
            tracing::debug!(ignored, "non-blocking exceptions have no effect");
        }
        Ok(spans)
    }

    fn normalize_bookings(
        &self,
        teacher_id: TeacherId,
        bookings: &[BookedInterval],
    ) -> Result<Vec<UtcSpan>> {
        let mut spans = Vec::new();
        for booking in bookings.iter().filter(|b| b.teacher_id == teacher_id) {
            let Some(span) = booking.span() else {
                tracing::warn!(
                    teacher = %teacher_id,
                    date = %booking.date,
                    start = %booking.start,
                    end = %booking.end,
                    "dropping booking with empty or inverted window"
                );
                continue;
            };
            let tz = self.zone_or_assumed(booking.zone.as_deref())?;
            spans.extend(blocker_to_utc(tz, booking.date, span));
        }
        Ok(spans)
    }

    fn zone_or_assumed(&self, declared: Option<&str>) -> Result<Tz> {
        match declared {
            Some(name) => zone::resolve_zone(name),
            None => Ok(self.assumed_zone),
        }
    }
}

/// Normalize an exception or booking. Gap boundaries always shift forward
/// regardless of the engine's policy; a blocker never loses real time.
fn blocker_to_utc(tz: Tz, date: NaiveDate, span: Span<TimeOfDay>) -> Option<UtcSpan> {
    zone::local_span_to_utc(tz, date, span, DstPolicy::ShiftForward)
}

/// Blockers that reach into `window`.
fn overlapping(spans: &[UtcSpan], window: &Span<DateTime<Utc>>) -> Vec<UtcSpan> {
    spans.iter().filter(|s| s.overlaps(window)).copied().collect()
}
