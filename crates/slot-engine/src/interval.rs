//! Half-open interval algebra.
//!
//! [`IntervalSet`] keeps its members in normal form: sorted by start, pairwise
//! non-overlapping and non-touching. Two spans that meet at a boundary
//! (`a.end == b.start`) do not overlap, but inside a set they are merged.
//!
//! The set is generic over the bound type so the same code runs on local
//! wall-clock values ([`TimeOfDay`]) and on UTC instants.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, SlotError};
use crate::model::RecurringAvailabilityRule;
use crate::time_of_day::TimeOfDay;

/// A half-open `[start, end)` range with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span<T> {
    start: T,
    end: T,
}

impl<T: Ord + Copy> Span<T> {
    /// Returns `None` for empty or inverted ranges.
    pub fn new(start: T, end: T) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    /// True when the spans share at least one point. Touching at a boundary
    /// is not overlap.
    pub fn overlaps(&self, other: &Span<T>) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn intersect(&self, other: &Span<T>) -> Option<Span<T>> {
        Span::new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// An ordered set of spans in normal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSet<T> {
    spans: Vec<Span<T>>,
}

impl<T> Default for IntervalSet<T> {
    fn default() -> Self {
        Self { spans: Vec::new() }
    }
}

impl<T: Ord + Copy> IntervalSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of arbitrary (possibly overlapping, unsorted) spans.
    pub fn from_spans<I>(spans: I) -> Self
    where
        I: IntoIterator<Item = Span<T>>,
    {
        let mut spans: Vec<Span<T>> = spans.into_iter().collect();
        if spans.is_empty() {
            return Self::default();
        }

        spans.sort_by_key(|s| (s.start, s.end));

        let mut merged: Vec<Span<T>> = Vec::with_capacity(spans.len());
        for span in spans {
            if let Some(last) = merged.last_mut() {
                if span.start <= last.end {
                    // Overlapping or touching: extend the current span.
                    last.end = last.end.max(span.end);
                    continue;
                }
            }
            merged.push(span);
        }

        Self { spans: merged }
    }

    pub fn union(&self, other: &IntervalSet<T>) -> IntervalSet<T> {
        Self::from_spans(self.spans.iter().chain(other.spans.iter()).copied())
    }

    /// Remove every blocker from the set.
    ///
    /// Blockers are applied one after another against the already-trimmed
    /// working set, so repeated, overlapping or adjacent blockers compose, and
    /// the order in which they are given does not change the result.
    pub fn subtract(&self, blockers: &[Span<T>]) -> IntervalSet<T> {
        let mut working = self.clone();
        for blocker in blockers {
            working.subtract_span(blocker);
        }
        working
    }

    /// Remove a single blocker in place.
    pub fn subtract_span(&mut self, blocker: &Span<T>) {
        if !self.spans.iter().any(|s| s.overlaps(blocker)) {
            return;
        }

        let mut remaining = Vec::with_capacity(self.spans.len() + 1);
        for span in self.spans.drain(..) {
            if !span.overlaps(blocker) {
                remaining.push(span);
                continue;
            }

            let covers_left = blocker.start <= span.start;
            let covers_right = blocker.end >= span.end;
            match (covers_left, covers_right) {
                // Fully covered.
                (true, true) => {}
                // Left edge: keep what follows the blocker.
                (true, false) => remaining.extend(Span::new(blocker.end, span.end)),
                // Right edge: keep what precedes the blocker.
                (false, true) => remaining.extend(Span::new(span.start, blocker.start)),
                // Interior: split in two.
                (false, false) => {
                    remaining.extend(Span::new(span.start, blocker.start));
                    remaining.extend(Span::new(blocker.end, span.end));
                }
            }
        }
        self.spans = remaining;
    }

    /// The part of the set that falls inside `window`.
    pub fn clip(&self, window: &Span<T>) -> IntervalSet<T> {
        Self {
            spans: self
                .spans
                .iter()
                .filter_map(|s| s.intersect(window))
                .collect(),
        }
    }

    pub fn contains(&self, point: T) -> bool {
        self.spans.iter().any(|s| s.start <= point && point < s.end)
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span<T>> {
        self.spans.iter()
    }

    pub fn as_slice(&self) -> &[Span<T>] {
        &self.spans
    }

    pub fn into_vec(self) -> Vec<Span<T>> {
        self.spans
    }
}

impl IntervalSet<TimeOfDay> {
    /// Seed a single day's windows from recurring rules, in their own
    /// wall-clock. Inactive rules are skipped; the caller picks the weekday.
    pub fn from_rules<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a RecurringAvailabilityRule>,
    {
        Self::from_spans(rules.into_iter().filter(|r| r.active).filter_map(|r| r.span()))
    }

    /// Attach `date` to each member.
    pub fn to_intervals(&self, date: NaiveDate) -> Vec<Interval> {
        self.spans
            .iter()
            .map(|s| Interval::from_span(date, *s))
            .collect()
    }

    /// Total seconds covered by the set.
    pub fn covered_seconds(&self) -> u32 {
        self.spans
            .iter()
            .map(|s| s.end().seconds_from_midnight() - s.start().seconds_from_midnight())
            .sum()
    }
}

impl<'a, T> IntoIterator for &'a IntervalSet<T> {
    type Item = &'a Span<T>;
    type IntoIter = std::slice::Iter<'a, Span<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

/// A bookable window on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    date: NaiveDate,
    start: TimeOfDay,
    end: TimeOfDay,
}

impl Interval {
    pub fn new(date: NaiveDate, start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { date, start, end })
    }

    pub fn from_span(date: NaiveDate, span: Span<TimeOfDay>) -> Self {
        Self {
            date,
            start: span.start,
            end: span.end,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn span(&self) -> Span<TimeOfDay> {
        Span {
            start: self.start,
            end: self.end,
        }
    }

    /// Length in seconds.
    pub fn duration_seconds(&self) -> u32 {
        self.end.seconds_from_midnight() - self.start.seconds_from_midnight()
    }
}
