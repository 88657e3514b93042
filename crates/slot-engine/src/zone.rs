//! Conversions between zoned wall-clock windows and UTC spans.
//!
//! The engine normalizes every input into UTC, runs the interval algebra
//! there, and converts the residue back into the display zone's wall-clock.

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};
use crate::interval::Span;
use crate::time_of_day::TimeOfDay;

/// Longest DST gap probed for. Covers whole skipped days such as
/// Pacific/Apia on 2011-12-30.
const MAX_GAP_MINUTES: i64 = 25 * 60;

pub type UtcSpan = Span<DateTime<Utc>>;

/// Resolve an IANA zone identifier.
pub fn resolve_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SlotError::TimezoneResolution(name.to_string()))
}

/// Map a local wall-clock datetime in `tz` to a UTC instant.
///
/// Returns `None` when the local time falls in a DST gap and the policy is
/// [`DstPolicy::Skip`].
pub fn to_utc(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_instant_after_gap(tz, local),
        },
    }
}

/// Walk forward minute by minute from a nonexistent local time until the
/// wall-clock exists again. Transitions fall on whole minutes.
fn first_instant_after_gap(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let aligned = local.with_second(0)?.with_nanosecond(0)?;
    (1..=MAX_GAP_MINUTES).find_map(|minutes| {
        let probe = aligned.checked_add_signed(TimeDelta::minutes(minutes))?;
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    })
}

/// The UTC instants covered by calendar day `date` in `tz`.
///
/// Consecutive days tile the timeline with no gaps or overlaps, including
/// 23- and 25-hour days.
pub fn day_window(tz: Tz, date: NaiveDate) -> Option<UtcSpan> {
    let start = to_utc(tz, TimeOfDay::MIDNIGHT.on(date)?, DstPolicy::ShiftForward)?;
    let end = to_utc(tz, TimeOfDay::END_OF_DAY.on(date)?, DstPolicy::ShiftForward)?;
    Span::new(start, end)
}

/// Normalize a wall-clock window on `date` in `tz` to UTC.
///
/// `None` when a boundary is skipped by `policy`, or when DST collapses the
/// window to nothing.
pub fn local_span_to_utc(
    tz: Tz,
    date: NaiveDate,
    span: Span<TimeOfDay>,
    policy: DstPolicy,
) -> Option<UtcSpan> {
    let start = to_utc(tz, span.start().on(date)?, policy)?;
    let end = to_utc(tz, span.end().on(date)?, policy)?;
    Span::new(start, end)
}

/// Express a UTC span lying inside `window` (the day `date` in `tz`) as
/// wall-clock on `date`.
///
/// Boundaries that coincide with the window's edges map to `00:00:00` and
/// `24:00:00`. A span crossing a fall-back transition is split there, since
/// the wall-clock repeats; the pieces may overlap once back in local time.
pub fn utc_span_to_local(
    tz: Tz,
    date: NaiveDate,
    window: &UtcSpan,
    span: &UtcSpan,
) -> Vec<Span<TimeOfDay>> {
    let mut pieces = Vec::new();
    let mut from = span.start();
    for at in fall_back_instants(tz, span) {
        let start = local_start(tz, date, window, from);
        let end = wall_clock_before(tz, date, at);
        pieces.extend(start.zip(end).and_then(|(s, e)| Span::new(s, e)));
        from = at;
    }
    let start = local_start(tz, date, window, from);
    let end = if span.end() >= window.end() {
        Some(TimeOfDay::END_OF_DAY)
    } else {
        wall_clock_on(tz, date, span.end())
    };
    pieces.extend(start.zip(end).and_then(|(s, e)| Span::new(s, e)));
    pieces
}

fn local_start(
    tz: Tz,
    date: NaiveDate,
    window: &UtcSpan,
    instant: DateTime<Utc>,
) -> Option<TimeOfDay> {
    if instant <= window.start() {
        Some(TimeOfDay::MIDNIGHT)
    } else {
        wall_clock_on(tz, date, instant)
    }
}

fn wall_clock_on(tz: Tz, date: NaiveDate, instant: DateTime<Utc>) -> Option<TimeOfDay> {
    let local = instant.with_timezone(&tz).naive_local();
    (local.date() == date).then(|| TimeOfDay::from(local.time()))
}

/// Wall-clock reading of `instant` under the offset in force just before it,
/// as an exclusive end on `date`.
fn wall_clock_before(tz: Tz, date: NaiveDate, instant: DateTime<Utc>) -> Option<TimeOfDay> {
    let offset = offset_seconds(tz, instant - TimeDelta::seconds(1));
    let local = instant.naive_utc() + TimeDelta::seconds(i64::from(offset));
    if local.date() == date {
        Some(TimeOfDay::from(local.time()))
    } else if local.date() == date.succ_opt()? && local.time() == chrono::NaiveTime::MIN {
        Some(TimeOfDay::END_OF_DAY)
    } else {
        None
    }
}

fn offset_seconds(tz: Tz, instant: DateTime<Utc>) -> i32 {
    tz.offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc()
}

/// Instants inside `span` where the UTC offset of `tz` drops, in order.
///
/// Each transition is located by bisection to the second. Two transitions
/// that cancel out inside one span are not detected.
fn fall_back_instants(tz: Tz, span: &UtcSpan) -> Vec<DateTime<Utc>> {
    let one_second = TimeDelta::seconds(1);
    let last = span.end() - one_second;
    let mut found = Vec::new();
    let mut from = span.start();
    while from < last {
        let offset = offset_seconds(tz, from);
        if offset_seconds(tz, last) == offset {
            break;
        }
        let (mut lo, mut hi) = (from, last);
        while hi - lo > one_second {
            let mid = lo + (hi - lo) / 2;
            if offset_seconds(tz, mid) == offset {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        if offset_seconds(tz, hi) < offset {
            found.push(hi);
        }
        from = hi;
    }
    found
}
