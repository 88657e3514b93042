//! # slot-engine
//!
//! Free-slot computation for tutor availability calendars.
//!
//! Given a teacher's recurring weekly availability, date-specific blocking
//! exceptions and existing bookings, computes the exact bookable windows on
//! every date of an inclusive range. Inputs may each carry their own IANA
//! zone; results are expressed in a single display zone.
//!
//! ## Modules
//!
//! - [`time_of_day`] — comparable `HH:MM:SS` wall-clock values
//! - [`interval`] — half-open spans and normal-form interval sets
//! - [`date_range`] — inclusive calendar-date iteration with weekdays
//! - [`model`] — rules, exceptions, bookings and free days
//! - [`zone`] — zone resolution and UTC normalization
//! - [`dst`] — DST gap policies
//! - [`engine`] — the per-date free-slot computation
//! - [`store`] — read-only store ports and an in-memory snapshot store
//! - [`query`] — the query endpoint with range limits
//! - [`error`] — Error types

pub mod date_range;
pub mod dst;
pub mod engine;
pub mod error;
pub mod interval;
pub mod model;
pub mod query;
pub mod store;
pub mod time_of_day;
pub mod zone;

pub use date_range::DateRange;
pub use dst::DstPolicy;
pub use engine::{EngineConfig, FreeSlotEngine};
pub use error::SlotError;
pub use interval::{Interval, IntervalSet, Span};
pub use model::{AvailabilityException, BookedInterval, FreeDay, RecurringAvailabilityRule, TeacherId};
pub use query::{AvailabilityService, FreeSlotsResponse, QueryLimits, SlotQuery};
pub use store::{InMemoryStore, SlotStore};
pub use time_of_day::TimeOfDay;
