//! WASM bindings for slot-engine.
//!
//! Exposes the free-slot query and the raw engine computation to JavaScript
//! via `wasm-bindgen`. All complex types are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use serde::Deserialize;
use slot_engine::model::{
    AvailabilityException, BookedInterval, RecurringAvailabilityRule, TeacherId,
};
use slot_engine::query::{AvailabilityService, DayDto, QueryLimits, SlotQuery};
use slot_engine::store::InMemoryStore;
use slot_engine::zone::resolve_zone;
use slot_engine::{DstPolicy, FreeSlotEngine};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON plumbing, kept free of `JsValue` so it can be tested natively
// ---------------------------------------------------------------------------

/// Input for [`compute_free_days`]: the engine's arguments in one object.
#[derive(Deserialize)]
struct ComputeInput {
    teacher_id: TeacherId,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    display_zone: String,
    #[serde(default)]
    assumed_zone: Option<String>,
    #[serde(default)]
    dst_policy: DstPolicy,
    #[serde(default)]
    rules: Vec<RecurringAvailabilityRule>,
    #[serde(default)]
    exceptions: Vec<AvailabilityException>,
    #[serde(default)]
    bookings: Vec<BookedInterval>,
}

fn free_slots_json(
    snapshot_json: &str,
    query_json: &str,
    max_span_days: Option<u32>,
) -> Result<String, String> {
    let store = InMemoryStore::from_json(snapshot_json)
        .map_err(|e| format!("Invalid snapshot JSON: {}", e))?;
    let query: SlotQuery =
        serde_json::from_str(query_json).map_err(|e| format!("Invalid query JSON: {}", e))?;

    let mut limits = QueryLimits::default();
    if let Some(max) = max_span_days {
        limits.max_span_days = u64::from(max);
    }

    let response = AvailabilityService::new(store)
        .with_limits(limits)
        .free_slots(&query)
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&response).map_err(|e| format!("Serialization error: {}", e))
}

fn compute_json(input_json: &str) -> Result<String, String> {
    let input: ComputeInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid input JSON: {}", e))?;

    let mut engine = FreeSlotEngine::new().with_dst_policy(input.dst_policy);
    if let Some(zone) = input.assumed_zone.as_deref() {
        engine = engine.with_assumed_zone(resolve_zone(zone).map_err(|e| e.to_string())?);
    }

    let days = engine
        .compute(
            input.teacher_id,
            input.start,
            input.end,
            &input.rules,
            &input.exceptions,
            &input.bookings,
            &input.display_zone,
        )
        .map_err(|e| e.to_string())?;

    let dtos: Vec<DayDto> = days.iter().map(DayDto::from).collect();
    serde_json::to_string(&dtos).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Answer a free-slot query against a snapshot.
///
/// `snapshot_json` is an object with optional `teachers`, `rules`,
/// `exceptions` and `bookings` arrays. `query_json` is
/// `{teacher_id, start, end, tz?}`. Returns a JSON string
/// `{teacher_id, timezone, days: [{date, slots: [{start, end}]}]}`.
#[wasm_bindgen(js_name = "freeSlots")]
pub fn free_slots(
    snapshot_json: &str,
    query_json: &str,
    max_span_days: Option<u32>,
) -> Result<String, JsValue> {
    free_slots_json(snapshot_json, query_json, max_span_days).map_err(|e| JsValue::from_str(&e))
}

/// Run the engine directly on caller-supplied rules, exceptions and bookings.
///
/// `input_json` carries `teacher_id`, `start`, `end`, `display_zone`, and
/// optionally `assumed_zone`, `dst_policy`, `rules`, `exceptions` and
/// `bookings`. Returns a JSON array of `{date, slots: [{start, end}]}`.
#[wasm_bindgen(js_name = "computeFreeDays")]
pub fn compute_free_days(input_json: &str) -> Result<String, JsValue> {
    compute_json(input_json).map_err(|e| JsValue::from_str(&e))
}
