//! Month/day loading and the staff-side availability and capacity edits.
//!
//! Every edit checks its preconditions, issues a single store write, then
//! reloads the whole month. The `*_in_view` variants check against slots the
//! caller already displays and reject without any store call; the plain
//! variants read the date's rows first. Nothing is patched locally, so a
//! failed write leaves the caller's view untouched.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    models::{
        calendar::{DaySnapshot, MonthRef, MonthSnapshot},
        schedule::{NewScheduleSlot, ScheduleSlot},
    },
    services::{
        calendar::build_calendar_grid,
        clock::Clock,
        metrics,
        orders::{count_by_slot, OrderAggregator},
        time_slots::build_time_slots,
    },
    store::{DuplicateSlotError, ScheduleStore},
};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("No time slots exist on {0}; add a time slot first")]
    NoSlotsForDate(NaiveDate),
    #[error("A time slot already exists on {date} at {time}")]
    DuplicateSlot { date: NaiveDate, time: NaiveTime },
    #[error("Maximum orders must be at least 1, got {0}")]
    InvalidCapacity(i32),
    #[error("Hour must be between 0 and 23, got {0}")]
    InvalidHour(u32),
    #[error("Deleting a time slot must be confirmed")]
    ConfirmationRequired,
    #[error("Time slot {0} not found")]
    SlotNotFound(Uuid),
    #[error("Selected schedule is no longer available. Please choose another time.")]
    SlotUnavailable,
    #[error("Failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ScheduleError {
    /// Raised locally before any write was attempted.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, ScheduleError::Store { .. })
    }

    fn reason(&self) -> &'static str {
        match self {
            ScheduleError::NoSlotsForDate(_) => "no_slots",
            ScheduleError::DuplicateSlot { .. } => "duplicate",
            ScheduleError::InvalidCapacity(_) => "invalid_capacity",
            ScheduleError::InvalidHour(_) => "invalid_hour",
            ScheduleError::ConfirmationRequired => "unconfirmed",
            ScheduleError::SlotNotFound(_) => "not_found",
            ScheduleError::SlotUnavailable => "unavailable",
            ScheduleError::Store { .. } => "store",
        }
    }
}

/// A completed edit: the row it concerned plus the reloaded month.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub slot: Option<ScheduleSlot>,
    pub date: NaiveDate,
    pub month: MonthSnapshot,
}

#[derive(Clone)]
pub struct ScheduleEditor {
    store: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
    default_max_orders: i32,
}

impl ScheduleEditor {
    pub fn new(store: Arc<dyn ScheduleStore>, clock: Arc<dyn Clock>, default_max_orders: i32) -> Self {
        Self {
            store,
            clock,
            default_max_orders,
        }
    }

    /// Slots of `month`, or an empty list if the fetch failed.
    pub async fn month_slots(&self, month: MonthRef) -> Vec<ScheduleSlot> {
        match self
            .store
            .slots_between(month.first_day(), month.last_day())
            .await
        {
            Ok(slots) => slots,
            Err(e) => {
                error!("Error fetching schedule for {month}: {e:#}");
                metrics::record_fetch_failure(metrics::FETCH_MONTH_SLOTS);
                Vec::new()
            }
        }
    }

    /// Fetches `month` and builds its grid. Never fails; fetch errors show up
    /// as a month without slots.
    pub async fn load_month(&self, month: MonthRef, selected_day: Option<u32>) -> MonthSnapshot {
        let slots = self.month_slots(month).await;
        let ids: Vec<Uuid> = slots.iter().map(|s| s.schedule_id).collect();
        let counts = OrderAggregator::counts(self.store.as_ref(), &ids).await;
        let days = build_calendar_grid(month, &slots, &counts, self.clock.today(), selected_day);

        MonthSnapshot {
            month,
            label: month.to_string(),
            days,
            slots,
        }
    }

    /// Time slots and orders of one date.
    pub async fn load_day(&self, date: NaiveDate) -> DaySnapshot {
        let slots = match self.store.slots_on(date).await {
            Ok(slots) => slots,
            Err(e) => {
                error!("Error fetching time slots for {date}: {e:#}");
                metrics::record_fetch_failure(metrics::FETCH_DAY_SLOTS);
                Vec::new()
            }
        };
        let orders = OrderAggregator::orders_for_day(self.store.as_ref(), &slots).await;
        let counts = count_by_slot(&orders);

        DaySnapshot {
            date,
            time_slots: build_time_slots(date, &slots, &counts),
            orders,
            order_limit: slots.first().map(|s| s.max_orders),
            is_available: slots.first().map(|s| s.is_available),
        }
    }

    /// Sets availability on every slot of `date`, checked against freshly
    /// read rows. Screens that already hold the month use
    /// [`ScheduleEditor::set_availability_in_view`].
    pub async fn set_availability(
        &self,
        date: NaiveDate,
        available: bool,
    ) -> Result<EditOutcome, ScheduleError> {
        let day = self.day_slots(date, SET_AVAILABILITY).await?;
        self.set_availability_in_view(&day, date, available).await
    }

    /// `view` holds the slots the caller is showing; a date without slots in
    /// it is rejected before the store is touched.
    pub async fn set_availability_in_view(
        &self,
        view: &[ScheduleSlot],
        date: NaiveDate,
        available: bool,
    ) -> Result<EditOutcome, ScheduleError> {
        let ids = ids_on(view, date, SET_AVAILABILITY)?;

        let touched = self
            .store
            .update_availability(&ids, available)
            .await
            .map_err(|e| store_failure(SET_AVAILABILITY, e))?;
        metrics::record_edit(SET_AVAILABILITY, true);
        info!("Set availability of {touched} slot(s) on {date} to {available}");

        Ok(self.outcome(None, date).await)
    }

    pub async fn set_capacity(
        &self,
        date: NaiveDate,
        max_orders: i32,
    ) -> Result<EditOutcome, ScheduleError> {
        check_capacity(max_orders, SET_CAPACITY)?;
        let day = self.day_slots(date, SET_CAPACITY).await?;
        self.set_capacity_in_view(&day, date, max_orders).await
    }

    pub async fn set_capacity_in_view(
        &self,
        view: &[ScheduleSlot],
        date: NaiveDate,
        max_orders: i32,
    ) -> Result<EditOutcome, ScheduleError> {
        check_capacity(max_orders, SET_CAPACITY)?;
        let ids = ids_on(view, date, SET_CAPACITY)?;

        let touched = self
            .store
            .update_capacity(&ids, max_orders)
            .await
            .map_err(|e| store_failure(SET_CAPACITY, e))?;
        metrics::record_edit(SET_CAPACITY, true);
        info!("Set order limit of {touched} slot(s) on {date} to {max_orders}");

        Ok(self.outcome(None, date).await)
    }

    /// Adds an available slot at `hour:00:00`. Capacity defaults to the
    /// limit currently shown for the date.
    pub async fn add_slot(
        &self,
        date: NaiveDate,
        hour: u32,
        max_orders: Option<i32>,
    ) -> Result<EditOutcome, ScheduleError> {
        slot_time(hour, max_orders)?;
        let day = self.day_slots(date, ADD_SLOT).await?;
        self.add_slot_in_view(&day, date, hour, max_orders).await
    }

    /// Duplicate check runs against `view` only. A slot created elsewhere
    /// since `view` was loaded still comes back as `DuplicateSlot`, from the
    /// store's unique key.
    pub async fn add_slot_in_view(
        &self,
        view: &[ScheduleSlot],
        date: NaiveDate,
        hour: u32,
        max_orders: Option<i32>,
    ) -> Result<EditOutcome, ScheduleError> {
        let time = slot_time(hour, max_orders)?;
        let day: Vec<&ScheduleSlot> = view.iter().filter(|s| s.schedule_date == date).collect();
        if day.iter().any(|s| s.schedule_time == time) {
            return Err(rejected(ADD_SLOT, ScheduleError::DuplicateSlot { date, time }));
        }

        let max_orders = max_orders
            .or_else(|| day.first().map(|s| s.max_orders))
            .unwrap_or(self.default_max_orders);
        let slot = self
            .store
            .insert_slot(NewScheduleSlot {
                schedule_date: date,
                schedule_time: time,
                max_orders,
                is_available: true,
            })
            .await
            .map_err(|e| match e.downcast_ref::<DuplicateSlotError>() {
                Some(dup) => rejected(
                    ADD_SLOT,
                    ScheduleError::DuplicateSlot {
                        date: dup.date,
                        time: dup.time,
                    },
                ),
                None => store_failure(ADD_SLOT, e),
            })?;
        metrics::record_edit(ADD_SLOT, true);
        info!("Added time slot {} on {date} at {time}", slot.schedule_id);

        Ok(self.outcome(Some(slot), date).await)
    }

    /// Removes a slot for good. `confirmed` must reflect an explicit user
    /// confirmation; without it nothing is sent to the store.
    pub async fn delete_slot(
        &self,
        schedule_id: Uuid,
        confirmed: bool,
    ) -> Result<EditOutcome, ScheduleError> {
        if !confirmed {
            return Err(rejected(DELETE_SLOT, ScheduleError::ConfirmationRequired));
        }

        let slot = self
            .store
            .delete_slot(schedule_id)
            .await
            .map_err(|e| store_failure(DELETE_SLOT, e))?
            .ok_or_else(|| rejected(DELETE_SLOT, ScheduleError::SlotNotFound(schedule_id)))?;
        metrics::record_edit(DELETE_SLOT, true);
        info!("Deleted time slot {schedule_id} on {}", slot.schedule_date);

        let date = slot.schedule_date;
        Ok(self.outcome(Some(slot), date).await)
    }

    async fn day_slots(
        &self,
        date: NaiveDate,
        action: &'static str,
    ) -> Result<Vec<ScheduleSlot>, ScheduleError> {
        self.store
            .slots_on(date)
            .await
            .map_err(|e| store_failure(action, e))
    }

    async fn outcome(&self, slot: Option<ScheduleSlot>, date: NaiveDate) -> EditOutcome {
        let month = self
            .load_month(MonthRef::containing(date), Some(date.day()))
            .await;
        EditOutcome { slot, date, month }
    }
}

const SET_AVAILABILITY: &str = "update availability";
const SET_CAPACITY: &str = "update order limit";
const ADD_SLOT: &str = "add time slot";
const DELETE_SLOT: &str = "delete time slot";

/// Every `(action, reason)` an edit can be refused with.
pub const REJECTION_LABELS: [(&str, &str); 8] = [
    (SET_AVAILABILITY, "no_slots"),
    (SET_CAPACITY, "no_slots"),
    (SET_CAPACITY, "invalid_capacity"),
    (ADD_SLOT, "invalid_hour"),
    (ADD_SLOT, "invalid_capacity"),
    (ADD_SLOT, "duplicate"),
    (DELETE_SLOT, "unconfirmed"),
    (DELETE_SLOT, "not_found"),
];

fn ids_on(
    view: &[ScheduleSlot],
    date: NaiveDate,
    action: &'static str,
) -> Result<Vec<Uuid>, ScheduleError> {
    let ids: Vec<Uuid> = view
        .iter()
        .filter(|s| s.schedule_date == date)
        .map(|s| s.schedule_id)
        .collect();
    if ids.is_empty() {
        return Err(rejected(action, ScheduleError::NoSlotsForDate(date)));
    }
    Ok(ids)
}

fn check_capacity(max_orders: i32, action: &'static str) -> Result<(), ScheduleError> {
    if max_orders < 1 {
        return Err(rejected(action, ScheduleError::InvalidCapacity(max_orders)));
    }
    Ok(())
}

fn slot_time(hour: u32, max_orders: Option<i32>) -> Result<NaiveTime, ScheduleError> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| rejected(ADD_SLOT, ScheduleError::InvalidHour(hour)))?;
    if let Some(max) = max_orders {
        check_capacity(max, ADD_SLOT)?;
    }
    Ok(time)
}

fn rejected(action: &'static str, err: ScheduleError) -> ScheduleError {
    warn!("Cannot {action}: {err}");
    metrics::record_rejection(action, err.reason());
    err
}

fn store_failure(action: &'static str, source: anyhow::Error) -> ScheduleError {
    error!("Error trying to {action}: {source:#}");
    metrics::record_edit(action, false);
    ScheduleError::Store { action, source }
}
