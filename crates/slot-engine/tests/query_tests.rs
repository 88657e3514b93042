//! Tests for the query endpoint over the in-memory store.

use chrono::NaiveDate;
use slot_engine::model::{AvailabilityException, BookedInterval, RecurringAvailabilityRule, TeacherId};
use slot_engine::query::{AvailabilityService, QueryLimits, SlotDto, SlotQuery};
use slot_engine::store::InMemoryStore;
use slot_engine::SlotError;

// ── Helpers ─────────────────────────────────────────────────────────────────

const TEACHER: TeacherId = TeacherId(42);

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn slot(start: &str, end: &str) -> SlotDto {
    SlotDto {
        start: start.to_string(),
        end: end.to_string(),
    }
}

/// A Tokyo-based teacher available Monday 09:00–12:00 local, with one
/// blocking exception and one booking on 2026-03-16.
fn tokyo_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    store.add_teacher(TEACHER, "Asia/Tokyo");
    store
        .add_rule(RecurringAvailabilityRule {
            teacher_id: TEACHER,
            day_of_week: 0,
            start: "09:00".parse().unwrap(),
            end: "12:00".parse().unwrap(),
            zone: "Asia/Tokyo".to_string(),
            active: true,
        })
        .unwrap();
    store.add_exception(AvailabilityException {
        teacher_id: TEACHER,
        date: d(2026, 3, 16),
        start: "10:00".parse().unwrap(),
        end: "10:30".parse().unwrap(),
        blocked: true,
        reason: Some("dentist".to_string()),
        zone: None,
    });
    store.add_booking(BookedInterval {
        teacher_id: TEACHER,
        date: d(2026, 3, 16),
        start: "11:00".parse().unwrap(),
        end: "11:30".parse().unwrap(),
        zone: None,
    });
    store
}

fn query(start: NaiveDate, end: NaiveDate, tz: Option<&str>) -> SlotQuery {
    SlotQuery {
        teacher_id: TEACHER,
        start,
        end,
        tz: tz.map(str::to_string),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[test]
fn defaults_to_teacher_zone_and_echoes_it() {
    let service = AvailabilityService::new(tokyo_store());
    let response = service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 22), None))
        .unwrap();

    assert_eq!(response.teacher_id, TEACHER);
    assert_eq!(response.timezone, "Asia/Tokyo");
    assert_eq!(response.days.len(), 1);
    assert_eq!(response.days[0].date, d(2026, 3, 16));
    assert_eq!(
        response.days[0].slots,
        vec![
            slot("09:00:00", "10:00:00"),
            slot("10:30:00", "11:00:00"),
            slot("11:30:00", "12:00:00"),
        ]
    );
}

#[test]
fn explicit_tz_shifts_results() {
    // Tokyo is UTC+9: Monday 09:00 local is 00:00 UTC. Naive exception and
    // booking times are read in the teacher's zone.
    let service = AvailabilityService::new(tokyo_store());
    let response = service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 16), Some("UTC")))
        .unwrap();

    assert_eq!(response.timezone, "UTC");
    assert_eq!(
        response.days[0].slots,
        vec![
            slot("00:00:00", "01:00:00"),
            slot("01:30:00", "02:00:00"),
            slot("02:30:00", "03:00:00"),
        ]
    );
}

#[test]
fn blank_tz_falls_back_to_teacher_zone() {
    let service = AvailabilityService::new(tokyo_store());
    let response = service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 16), Some("  ")))
        .unwrap();
    assert_eq!(response.timezone, "Asia/Tokyo");
}

#[test]
fn unknown_teacher_is_not_found() {
    let service = AvailabilityService::new(tokyo_store());
    let mut q = query(d(2026, 3, 16), d(2026, 3, 16), None);
    q.teacher_id = TeacherId(1);
    assert_eq!(service.free_slots(&q), Err(SlotError::NotFound(TeacherId(1))));
}

#[test]
fn inverted_range_is_rejected_before_lookup() {
    let service = AvailabilityService::new(InMemoryStore::new());
    let err = service
        .free_slots(&query(d(2026, 3, 17), d(2026, 3, 16), None))
        .unwrap_err();
    assert!(matches!(err, SlotError::InvalidRange { .. }));
}

#[test]
fn bookings_two_days_out_are_fetched_for_distant_zones() {
    // Kiritimati is UTC+14 and Pago Pago UTC-11. Wednesday 00:00–02:00 in
    // Kiritimati is Monday 23:00 to Tuesday 01:00 in Pago Pago, and the
    // Wednesday booking covers the Monday part.
    let mut store = InMemoryStore::new();
    store.add_teacher(TEACHER, "Pacific/Kiritimati");
    store
        .add_rule(RecurringAvailabilityRule {
            teacher_id: TEACHER,
            day_of_week: 2,
            start: "00:00".parse().unwrap(),
            end: "02:00".parse().unwrap(),
            zone: "Pacific/Kiritimati".to_string(),
            active: true,
        })
        .unwrap();
    store.add_booking(BookedInterval {
        teacher_id: TEACHER,
        date: d(2026, 3, 18),
        start: "00:00".parse().unwrap(),
        end: "01:00".parse().unwrap(),
        zone: None,
    });
    let service = AvailabilityService::new(store);

    let monday = service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 16), Some("Pacific/Pago_Pago")))
        .unwrap();
    assert!(monday.days.is_empty(), "{:?}", monday.days);

    let both = service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 17), Some("Pacific/Pago_Pago")))
        .unwrap();
    assert_eq!(both.days.len(), 1);
    assert_eq!(both.days[0].date, d(2026, 3, 17));
    assert_eq!(both.days[0].slots, vec![slot("00:00:00", "01:00:00")]);
}

#[test]
fn range_longer_than_limit_is_rejected() {
    let service = AvailabilityService::new(tokyo_store())
        .with_limits(QueryLimits { max_span_days: 7 });

    assert!(service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 22), None))
        .is_ok());
    assert_eq!(
        service.free_slots(&query(d(2026, 3, 16), d(2026, 3, 23), None)),
        Err(SlotError::RangeTooLong { days: 8, max: 7 })
    );
}

#[test]
fn bad_display_zone_is_rejected() {
    let service = AvailabilityService::new(tokyo_store());
    assert_eq!(
        service.free_slots(&query(d(2026, 3, 16), d(2026, 3, 16), Some("Tokyo"))),
        Err(SlotError::TimezoneResolution("Tokyo".to_string()))
    );
}

#[test]
fn response_serializes_with_string_times() {
    let service = AvailabilityService::new(tokyo_store());
    let response = service
        .free_slots(&query(d(2026, 3, 16), d(2026, 3, 16), None))
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["teacher_id"], 42);
    assert_eq!(json["timezone"], "Asia/Tokyo");
    assert_eq!(json["days"][0]["date"], "2026-03-16");
    assert_eq!(json["days"][0]["slots"][0]["start"], "09:00:00");
    assert_eq!(json["days"][0]["slots"][0]["end"], "10:00:00");
}

#[test]
fn query_deserializes_without_tz() {
    let q: SlotQuery =
        serde_json::from_str(r#"{"teacher_id": 42, "start": "2026-03-16", "end": "2026-03-20"}"#)
            .unwrap();
    assert_eq!(q.tz, None);
    assert_eq!(q.end, d(2026, 3, 20));
}
