//! Checkout-side view of the schedule: which dates and times a customer may
//! still book, and mapping the time they picked back to a slot.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::{
    models::schedule::ScheduleSlot,
    services::{
        metrics,
        orders::{OrderAggregator, OrderCounts},
        schedule::ScheduleError,
        time_slots::{format_12h, parse_12h},
    },
    store::ScheduleStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookableTime {
    pub schedule_id: Uuid,
    /// "2:00 PM"
    pub display: String,
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookableDate {
    pub date: NaiveDate,
    pub times: Vec<BookableTime>,
}

/// Open slots from `today` on, grouped by date. A slot is open when it is
/// marked available and has fewer orders than its limit.
pub fn bookable_dates(
    slots: &[ScheduleSlot],
    counts: &OrderCounts,
    today: NaiveDate,
) -> Vec<BookableDate> {
    let mut open: Vec<&ScheduleSlot> = slots
        .iter()
        .filter(|s| s.is_available && s.schedule_date >= today)
        .filter(|s| remaining(s, counts) > 0)
        .collect();
    open.sort_by_key(|s| (s.schedule_date, s.schedule_time));

    let mut dates: Vec<BookableDate> = Vec::new();
    for slot in open {
        let time = BookableTime {
            schedule_id: slot.schedule_id,
            display: format_12h(slot.schedule_time),
            remaining: remaining(slot, counts),
        };
        match dates.last_mut() {
            Some(last) if last.date == slot.schedule_date => last.times.push(time),
            _ => dates.push(BookableDate {
                date: slot.schedule_date,
                times: vec![time],
            }),
        }
    }
    dates
}

fn remaining(slot: &ScheduleSlot, counts: &OrderCounts) -> i64 {
    i64::from(slot.max_orders) - counts.get(&slot.schedule_id).copied().unwrap_or(0)
}

/// Finds the open slot for the date and 12-hour time a customer picked.
pub fn resolve_slot<'a>(
    dates: &'a [BookableDate],
    date: NaiveDate,
    display_time: &str,
) -> Result<&'a BookableTime, ScheduleError> {
    let wanted = parse_12h(display_time).map_err(|_| ScheduleError::SlotUnavailable)?;
    dates
        .iter()
        .filter(|d| d.date == date)
        .flat_map(|d| d.times.iter())
        .find(|t| parse_12h(&t.display).ok() == Some(wanted))
        .ok_or(ScheduleError::SlotUnavailable)
}

pub struct BookingService;

impl BookingService {
    /// Open slots between `today` and `today + horizon_days`.
    pub async fn list(
        store: &dyn ScheduleStore,
        today: NaiveDate,
        horizon_days: i64,
    ) -> Vec<BookableDate> {
        let end = Duration::try_days(horizon_days)
            .and_then(|horizon| today.checked_add_signed(horizon))
            .unwrap_or(NaiveDate::MAX);
        let slots = match store.slots_between(today, end).await {
            Ok(slots) => slots,
            Err(e) => {
                error!("Error fetching schedules: {e:#}");
                metrics::record_fetch_failure(metrics::FETCH_BOOKABLE_SLOTS);
                return Vec::new();
            }
        };
        let ids: Vec<Uuid> = slots.iter().map(|s| s.schedule_id).collect();
        let counts = OrderAggregator::counts(store, &ids).await;
        bookable_dates(&slots, &counts, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::collections::HashMap;

    fn slot(day: u32, hour: u32, available: bool, max: i32) -> ScheduleSlot {
        ScheduleSlot {
            schedule_id: Uuid::new_v4(),
            schedule_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            schedule_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            max_orders: max,
            is_available: available,
        }
    }

    #[test]
    fn skips_past_unavailable_and_full_slots() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        let past = slot(16, 10, true, 30);
        let closed = slot(17, 9, false, 30);
        let full = slot(17, 10, true, 2);
        let open = slot(17, 14, true, 30);
        let later = slot(18, 11, true, 30);

        let mut counts = HashMap::new();
        counts.insert(full.schedule_id, 2);
        counts.insert(open.schedule_id, 5);

        let dates = bookable_dates(
            &[later.clone(), past, closed, full, open.clone()],
            &counts,
            today,
        );
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].date, today);
        assert_eq!(dates[0].times.len(), 1);
        assert_eq!(dates[0].times[0].schedule_id, open.schedule_id);
        assert_eq!(dates[0].times[0].display, "2:00 PM");
        assert_eq!(dates[0].times[0].remaining, 25);
        assert_eq!(dates[1].times[0].schedule_id, later.schedule_id);
    }

    #[test]
    fn resolves_picked_time() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 17).unwrap();
        let open = slot(17, 14, true, 30);
        let dates = bookable_dates(&[open.clone()], &HashMap::new(), today);

        let found = resolve_slot(&dates, today, "02:00 PM").unwrap();
        assert_eq!(found.schedule_id, open.schedule_id);

        assert!(matches!(
            resolve_slot(&dates, today, "3:00 PM"),
            Err(ScheduleError::SlotUnavailable)
        ));
        assert!(matches!(
            resolve_slot(&dates, today.succ_opt().unwrap(), "2:00 PM"),
            Err(ScheduleError::SlotUnavailable)
        ));
    }
}
