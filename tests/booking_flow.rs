// End-to-end exercise of the public engine API against the in-memory
// collaborators: configure a restaurant, browse slots, book, collide,
// reschedule, cancel, re-book.

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};

use maitred::catalog::{StaticHours, StaticTables};
use maitred::model::{
    DayHours, ReservationPatch, ReservationRequest, ReservationStatus, Shift, Table, TableStatus,
};
use maitred::store::MemoryStore;
use maitred::time::TimeOfDay;
use maitred::{Engine, EngineError};

const RID: u64 = 42;

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn setup() -> (Arc<StaticTables>, Engine) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let hours = Arc::new(StaticHours::new());
    let tables = Arc::new(StaticTables::new());
    let store = Arc::new(MemoryStore::new());

    // Open Friday evenings with lunch and dinner service, closed Mondays.
    for weekday in [Weekday::Fri, Weekday::Sat] {
        hours.set(
            RID,
            weekday,
            DayHours::open(vec![
                Shift::new("Lunch", t("12:00"), t("14:30")).unwrap(),
                Shift::new("Dinner", t("18:00"), t("22:00")).unwrap(),
            ]),
        );
    }
    hours.set(RID, Weekday::Mon, DayHours::closed());

    for (id, capacity) in [(1, 2), (2, 4), (3, 4), (4, 8)] {
        tables.add(Table { id, restaurant_id: RID, capacity, status: TableStatus::Available });
    }

    (tables.clone(), Engine::new(hours, tables, store))
}

fn friday() -> NaiveDate {
    // 2025-06-06 is a Friday.
    "2025-06-06".parse().unwrap()
}

fn request(time: &str, party_size: u32, table_id: Option<u64>) -> ReservationRequest {
    ReservationRequest {
        restaurant_id: RID,
        table_id,
        customer_name: "Margaret Hamilton".into(),
        customer_phone: "555-0134".into(),
        customer_email: Some("margaret@example.com".into()),
        party_size,
        date: friday(),
        time: time.parse().unwrap(),
        special_requests: None,
    }
}

#[tokio::test]
async fn full_booking_lifecycle() {
    let (_tables, engine) = setup();

    // Both services appear, dinner gridded 18:00–20:30.
    let slots = engine.available_time_slots(RID, friday(), 4).await.unwrap();
    let rendered: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        rendered,
        vec!["12:00", "12:30", "13:00", "18:00", "18:30", "19:00", "19:30", "20:00", "20:30"]
    );

    // Best-fit for a party of four: the two 4-tops, then the 8-top.
    let free = engine
        .available_tables_for_time(RID, friday(), t("19:00"), 4)
        .await
        .unwrap();
    assert_eq!(free.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3, 4]);

    // Book the best-fit table.
    let booked = engine
        .create_reservation(request("19:00", 4, Some(2)))
        .await
        .unwrap();
    assert_eq!(booked.status, ReservationStatus::Pending);
    assert_eq!(booked.end_time, t("20:30"));

    // The window it occupies no longer offers that table.
    let free = engine
        .available_tables_for_time(RID, friday(), t("19:30"), 4)
        .await
        .unwrap();
    assert!(!free.iter().any(|t| t.id == 2));

    // A second party wanting the same table at an overlapping time loses.
    let clash = engine.create_reservation(request("19:30", 4, Some(2))).await;
    assert!(matches!(clash, Err(EngineError::TableUnavailable { table_id: 2 })));

    // But the slot itself stays open while other tables can host.
    engine.create_reservation(request("19:30", 4, Some(3))).await.unwrap();

    // Reschedule the first booking to lunch; end time follows.
    let moved = engine
        .update_reservation(
            booked.id,
            ReservationPatch { time: Some(t("12:30")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(moved.time, t("12:30"));
    assert_eq!(moved.end_time, t("14:00"));

    // Cancel it and the lunch grid is whole again.
    engine.cancel_reservation(moved.id, Some("change of plans")).await.unwrap();
    let slots = engine.available_time_slots(RID, friday(), 4).await.unwrap();
    assert!(slots.contains(&t("12:30")));

    // Cancelling twice is refused.
    assert!(matches!(
        engine.cancel_reservation(moved.id, None).await,
        Err(EngineError::AlreadyCancelled(_))
    ));

    // Closed Monday offers nothing.
    let monday: NaiveDate = "2025-06-02".parse().unwrap();
    assert!(engine.available_time_slots(RID, monday, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn staff_taking_a_table_out_of_service_blocks_new_bookings() {
    let (tables, engine) = setup();

    // A cosy party of two fits only the 2-top once larger tables fill up.
    tables.set_status(RID, 2, TableStatus::Occupied);
    tables.set_status(RID, 3, TableStatus::Occupied);
    tables.set_status(RID, 4, TableStatus::Maintenance);

    let free = engine
        .available_tables_for_time(RID, friday(), t("19:00"), 2)
        .await
        .unwrap();
    assert_eq!(free.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);

    tables.set_status(RID, 1, TableStatus::Maintenance);
    let none = engine.available_time_slots(RID, friday(), 2).await.unwrap();
    assert!(none.is_empty());
}
