//! End-to-end booking flow over the public API: configure a venue, take
//! bookings, manage tables, and read the occupancy dashboard.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use maitre::config::PolicyConfig;
use maitre::engine::{BookingRequest, Engine, EngineError, RejectReason};
use maitre::model::{OpeningHours, SpecialOpeningDay, Table, Zone};
use maitre::{ReservationStatus, SeatingPreference};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn t(s: &str) -> NaiveTime {
    format!("{s}:00").parse().unwrap()
}

fn dt(date: &str, time: &str) -> NaiveDateTime {
    d(date).and_time(t(time))
}

fn configure_venue(policy: PolicyConfig) -> Engine {
    let engine = Engine::with_policy(policy).unwrap();
    for weekday in [
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ] {
        engine.set_opening_hours(OpeningHours {
            weekday,
            is_open: true,
            open_time: Some(t("12:00")),
            close_time: Some(t("23:00")),
            last_reservation_time: Some(t("21:30")),
        });
    }
    // Closed on Mondays.
    engine.set_opening_hours(OpeningHours {
        weekday: Weekday::Mon,
        is_open: false,
        open_time: None,
        close_time: None,
        last_reservation_time: None,
    });
    engine
}

fn table(label: &str, area: Zone, engine: &Engine) -> ulid::Ulid {
    let table = Table {
        id: ulid::Ulid::new(),
        label: label.into(),
        capacity: 6,
        area,
        is_active: true,
    };
    let id = table.id;
    engine.upsert_table(table);
    id
}

fn booking(date: &str, time: &str, party_size: u32, pref: SeatingPreference) -> BookingRequest {
    BookingRequest {
        name: "Iris".into(),
        email: "iris@example.com".into(),
        phone: "555-0123".into(),
        date: Some(d(date)),
        time: Some(t(time)),
        party_size,
        seating_preference: pref,
        ..BookingRequest::default()
    }
}

#[tokio::test]
async fn a_full_service_day() {
    init_tracing();
    let engine = configure_venue(PolicyConfig {
        indoor_capacity: 12,
        outdoor_capacity: 8,
        ..PolicyConfig::default()
    });
    let window = table("W1", Zone::Indoor, &engine);
    let terrace = table("Terrace-1", Zone::Outdoor, &engine);
    let now = dt("2030-06-01", "10:00");
    // 2030-06-15 is a Saturday.
    let service_day = d("2030-06-15");

    // Two bookings go in; the third would overflow indoor.
    let first = engine
        .submit_at(
            &booking("2030-06-15", "19:00", 6, SeatingPreference::IndoorOnly),
            now,
        )
        .await
        .unwrap()
        .unwrap();
    let second = engine
        .submit_at(
            &booking("2030-06-15", "19:30", 6, SeatingPreference::IndoorOnly),
            now,
        )
        .await
        .unwrap()
        .unwrap();
    let overflow = engine
        .submit_at(
            &booking("2030-06-15", "19:45", 2, SeatingPreference::IndoorOnly),
            now,
        )
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(overflow, vec![RejectReason::FullyBooked]);

    // An undecided guest is pointed at the terrace instead.
    let undecided = engine
        .submit_at(
            &booking("2030-06-15", "19:45", 2, SeatingPreference::NoPreference),
            now,
        )
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(undecided, vec![RejectReason::TryOutdoor]);

    // Staff confirm and seat the first party.
    engine
        .set_status(first.id, ReservationStatus::Confirmed)
        .await
        .unwrap();
    engine.assign_table(first.id, Some(window)).await.unwrap();

    // The overlapping second party cannot take the same table.
    let err = engine.assign_table(second.id, Some(window)).await;
    assert!(matches!(err, Err(EngineError::TableInUse(id)) if id == window));
    engine.assign_table(second.id, Some(terrace)).await.unwrap();

    // The dashboard sees the assigned areas and the quiet gaps.
    let timeline = engine.day_timeline_at(service_day, now).await;
    assert!(!timeline.hours.is_empty());
    let peak = timeline
        .hours
        .iter()
        .find(|h| h.start == dt("2030-06-15", "19:00"))
        .unwrap();
    assert_eq!(peak.indoor, 6);
    assert_eq!(peak.outdoor, 6);

    let listed = engine.reservations_for_date(service_day).await;
    assert_eq!(listed.len(), 2);
    assert!(listed.windows(2).all(|w| w[0].time <= w[1].time));
}

#[tokio::test]
async fn closed_days_and_special_openings() {
    init_tracing();
    let engine = configure_venue(PolicyConfig::default());

    // 2030-06-17 is a Monday — closed by the weekly schedule.
    let monday = engine
        .submit_at(
            &booking("2030-06-17", "19:00", 2, SeatingPreference::NoPreference),
            dt("2030-06-01", "10:00"),
        )
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(
        monday,
        vec![RejectReason::ClosedOnDate {
            date: d("2030-06-17")
        }]
    );

    // Christmas opens with its own hours and a delayed booking window.
    engine.set_special_day(SpecialOpeningDay {
        date: d("2030-12-25"),
        is_open: true,
        bookings_open_from: d("2030-12-01"),
        public_message: Some("Festive set menu.".into()),
        open_time: Some(t("13:00")),
        close_time: Some(t("20:00")),
        last_reservation_time: Some(t("18:30")),
    });

    // The reservation page can surface the special-day notice.
    match engine.day_status(d("2030-12-25"), d("2030-12-02")) {
        maitre::engine::DayStatus::Open { message, .. } => {
            assert_eq!(message.as_deref(), Some("Festive set menu."));
        }
        other => panic!("expected an open day, got {other:?}"),
    }

    let request = booking("2030-12-25", "14:00", 4, SeatingPreference::NoPreference);
    let too_early = engine
        .submit_at(&request, dt("2030-11-20", "09:00"))
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(
        too_early,
        vec![RejectReason::BookingsNotOpenYet {
            opens_on: d("2030-12-01")
        }]
    );

    assert!(engine
        .submit_at(&request, dt("2030-12-02", "09:00"))
        .await
        .unwrap()
        .is_ok());

    let after_last = booking("2030-12-25", "19:00", 4, SeatingPreference::NoPreference);
    let rejected = engine
        .submit_at(&after_last, dt("2030-12-02", "09:00"))
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(
        rejected,
        vec![RejectReason::OutsideBookingHours {
            open: t("13:00"),
            last: t("18:30")
        }]
    );
}

#[tokio::test]
async fn closing_the_reservation_book() {
    init_tracing();
    let engine = configure_venue(PolicyConfig::default());

    engine
        .update_policy(PolicyConfig {
            reservations_open: false,
            closure_message: Some("Closed for a private event this week.".into()),
            ..PolicyConfig::default()
        })
        .await
        .unwrap();

    let reasons = engine
        .submit_at(
            &booking("2030-06-15", "19:00", 2, SeatingPreference::NoPreference),
            dt("2030-06-01", "10:00"),
        )
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(
        reasons,
        vec![RejectReason::ReservationsClosed {
            message: "Closed for a private event this week.".into()
        }]
    );
}
