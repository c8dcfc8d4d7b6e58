use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use schedule_api::{
    models::{calendar::MonthRef, order::CustomerOrder, schedule::ScheduleSlot},
    services::{
        clock::FixedClock,
        schedule::{ScheduleEditor, ScheduleError},
    },
    store::MemoryScheduleStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn slot(d: NaiveDate, hour: u32, available: bool, max: i32) -> ScheduleSlot {
    ScheduleSlot {
        schedule_id: Uuid::new_v4(),
        schedule_date: d,
        schedule_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        max_orders: max,
        is_available: available,
    }
}

fn order_for(s: &ScheduleSlot, name: &str) -> CustomerOrder {
    CustomerOrder {
        order_id: Uuid::new_v4(),
        customer_uid: Uuid::new_v4(),
        customer_name: name.to_string(),
        schedule_id: s.schedule_id,
        schedule_time: s.schedule_time,
        order_status: "Pending".into(),
        created_at: Utc::now(),
    }
}

fn editor(store: Arc<MemoryScheduleStore>) -> ScheduleEditor {
    ScheduleEditor::new(store, Arc::new(FixedClock(date(2025, 5, 17))), 30)
}

fn may_2025() -> MonthRef {
    MonthRef::new(2025, 4).unwrap()
}

#[tokio::test]
async fn month_grid_sums_orders_across_slots() {
    let d = date(2025, 5, 17);
    let morning = slot(d, 10, true, 20);
    let afternoon = slot(d, 14, true, 20);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![morning.clone(), afternoon.clone()]));
    for _ in 0..3 {
        store.push_order(order_for(&morning, "Ana Cruz")).await;
    }
    for _ in 0..5 {
        store.push_order(order_for(&afternoon, "Ben Reyes")).await;
    }

    let snapshot = editor(store).load_month(may_2025(), Some(17)).await;
    assert_eq!(snapshot.label, "May 2025");
    assert_eq!(snapshot.days.len(), 42);

    let cell = snapshot
        .days
        .iter()
        .find(|c| !c.is_filler() && c.date == 17)
        .unwrap();
    assert_eq!(cell.orders, 8);
    assert!(cell.is_today);
    assert!(cell.is_selected);
    assert_eq!(cell.max_orders, Some(20));
}

#[tokio::test]
async fn failed_fetch_degrades_to_empty_month() {
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![slot(date(2025, 5, 3), 9, true, 30)]));
    store.set_failing(true);

    let snapshot = editor(store.clone()).load_month(may_2025(), None).await;
    assert_eq!(snapshot.days.len(), 42);
    assert!(snapshot.slots.is_empty());
    assert!(snapshot.days.iter().all(|d| d.orders == 0 && d.is_available.is_none()));

    let day = editor(store).load_day(date(2025, 5, 3)).await;
    assert!(day.time_slots.is_empty());
    assert!(day.orders.is_empty());
}

#[tokio::test]
async fn day_view_is_sorted_with_orders() {
    let d = date(2025, 5, 17);
    let late = slot(d, 14, true, 30);
    let noon = slot(d, 12, false, 30);
    let early = slot(d, 9, true, 30);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![
        late.clone(),
        noon.clone(),
        early.clone(),
    ]));
    store.push_order(order_for(&late, "Ana Cruz")).await;

    let day = editor(store).load_day(d).await;
    let labels: Vec<&str> = day.time_slots.iter().map(|t| t.display.as_str()).collect();
    assert_eq!(labels, vec!["9:00 AM", "12:00 PM", "2:00 PM"]);
    assert_eq!(day.time_slots[2].orders, 1);
    assert!(!day.time_slots[1].is_available);
    assert_eq!(day.orders.len(), 1);
    assert_eq!(day.orders[0].customer_name, "Ana Cruz");
}

#[tokio::test]
async fn bulk_edits_refuse_dates_without_slots() {
    let store = Arc::new(MemoryScheduleStore::new());
    let editor = editor(store.clone());

    let err = editor.set_availability(date(2025, 5, 20), true).await.unwrap_err();
    assert!(matches!(err, ScheduleError::NoSlotsForDate(_)));
    assert!(err.is_precondition());

    let err = editor.set_capacity(date(2025, 5, 20), 10).await.unwrap_err();
    assert!(matches!(err, ScheduleError::NoSlotsForDate(_)));

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn availability_applies_to_every_slot_of_the_date() {
    let d = date(2025, 5, 17);
    let other = slot(date(2025, 5, 18), 9, true, 30);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![
        slot(d, 9, true, 30),
        slot(d, 13, true, 30),
        other.clone(),
    ]));

    let outcome = editor(store.clone()).set_availability(d, false).await.unwrap();
    assert_eq!(outcome.date, d);

    let slots = store.all_slots().await;
    assert!(slots.iter().filter(|s| s.schedule_date == d).all(|s| !s.is_available));
    assert!(slots.iter().find(|s| s.schedule_id == other.schedule_id).unwrap().is_available);

    let cell = outcome
        .month
        .days
        .iter()
        .find(|c| !c.is_filler() && c.date == 17)
        .unwrap();
    assert_eq!(cell.is_available, Some(false));
}

#[tokio::test]
async fn capacity_is_validated_then_applied() {
    let d = date(2025, 5, 17);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![slot(d, 9, true, 30), slot(d, 10, true, 25)]));
    let editor = editor(store.clone());

    let err = editor.set_capacity(d, 0).await.unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidCapacity(0)));
    assert_eq!(store.call_count(), 0);

    editor.set_capacity(d, 45).await.unwrap();
    assert!(store.all_slots().await.iter().all(|s| s.max_orders == 45));
}

#[tokio::test]
async fn add_slot_rejects_duplicates_without_writing() {
    let d = date(2025, 5, 17);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![slot(d, 14, true, 30)]));

    let err = editor(store.clone()).add_slot(d, 14, None).await.unwrap_err();
    assert!(matches!(err, ScheduleError::DuplicateSlot { .. }));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn add_slot_inherits_the_displayed_limit() {
    let d = date(2025, 5, 17);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![slot(d, 9, false, 12)]));
    let editor = editor(store.clone());

    let outcome = editor.add_slot(d, 11, None).await.unwrap();
    let added = outcome.slot.unwrap();
    assert_eq!(added.max_orders, 12);
    assert!(added.is_available);
    assert_eq!(added.schedule_time, NaiveTime::from_hms_opt(11, 0, 0).unwrap());

    let fresh = editor.add_slot(date(2025, 5, 18), 9, None).await.unwrap();
    assert_eq!(fresh.slot.unwrap().max_orders, 30);

    let explicit = editor.add_slot(date(2025, 5, 18), 10, Some(8)).await.unwrap();
    assert_eq!(explicit.slot.unwrap().max_orders, 8);

    assert!(matches!(
        editor.add_slot(d, 24, None).await,
        Err(ScheduleError::InvalidHour(24))
    ));
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let d = date(2025, 5, 17);
    let target = slot(d, 9, true, 30);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![target.clone()]));
    let editor = editor(store.clone());

    let err = editor.delete_slot(target.schedule_id, false).await.unwrap_err();
    assert!(matches!(err, ScheduleError::ConfirmationRequired));
    assert_eq!(store.call_count(), 0);

    let outcome = editor.delete_slot(target.schedule_id, true).await.unwrap();
    assert_eq!(outcome.slot.unwrap().schedule_id, target.schedule_id);
    assert!(store.all_slots().await.is_empty());

    assert!(matches!(
        editor.delete_slot(target.schedule_id, true).await,
        Err(ScheduleError::SlotNotFound(_))
    ));
}

#[tokio::test]
async fn store_failure_surfaces_as_error() {
    let d = date(2025, 5, 17);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![slot(d, 9, true, 30)]));
    store.set_failing(true);

    let err = editor(store).set_availability(d, false).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Store { .. }));
    assert!(!err.is_precondition());
}

#[tokio::test]
async fn edits_checked_against_the_loaded_view_never_reach_the_store() {
    let d = date(2025, 5, 17);
    let existing = slot(d, 14, true, 30);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![existing.clone()]));
    let editor = editor(store.clone());
    let view = vec![existing];

    let err = editor
        .set_availability_in_view(&view, date(2025, 5, 20), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NoSlotsForDate(_)));

    let err = editor
        .set_capacity_in_view(&view, date(2025, 5, 20), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NoSlotsForDate(_)));

    let err = editor.add_slot_in_view(&view, d, 14, None).await.unwrap_err();
    assert!(matches!(err, ScheduleError::DuplicateSlot { .. }));

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn slot_added_elsewhere_still_reports_a_duplicate() {
    let d = date(2025, 5, 17);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![slot(d, 14, true, 30)]));

    // Loaded before the other writer's insert landed.
    let stale_view: Vec<ScheduleSlot> = Vec::new();
    let err = editor(store.clone())
        .add_slot_in_view(&stale_view, d, 14, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ScheduleError::DuplicateSlot { .. }));
    assert!(err.is_precondition());
    assert_eq!(store.all_slots().await.len(), 1);
}

#[tokio::test]
async fn failed_order_fetch_still_renders_slots() {
    let d = date(2025, 5, 17);
    let booked = slot(d, 10, false, 15);
    let store = Arc::new(MemoryScheduleStore::with_slots(vec![booked.clone()]));
    store.push_order(order_for(&booked, "Ana Cruz")).await;
    store.set_orders_failing(true);

    let month = editor(store).load_month(may_2025(), None).await;

    assert_eq!(month.slots.len(), 1);
    let cell = month.days.iter().find(|c| !c.is_filler() && c.date == 17).unwrap();
    assert_eq!(cell.orders, 0);
    assert_eq!(cell.is_available, Some(false));
    assert_eq!(cell.max_orders, Some(15));
}
