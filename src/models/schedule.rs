use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Capacity given to a slot when nothing else is known about its date.
pub const DEFAULT_MAX_ORDERS: i32 = 30;

/// Hours offered by the staff "add slot" buttons (09:00 through 17:00).
pub const STAFF_HOURS: std::ops::RangeInclusive<u32> = 9..=17;

/// One orderable time window on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ScheduleSlot {
    pub schedule_id: Uuid,
    pub schedule_date: NaiveDate,
    pub schedule_time: NaiveTime,
    pub max_orders: i32,
    pub is_available: bool,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleSlot {
    pub schedule_date: NaiveDate,
    pub schedule_time: NaiveTime,
    pub max_orders: i32,
    pub is_available: bool,
}

/// Body for PUT /schedule/day/availability.
#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub date: NaiveDate,
    pub is_available: bool,
}

/// Body for PUT /schedule/day/capacity.
#[derive(Debug, Deserialize)]
pub struct SetCapacityRequest {
    pub date: NaiveDate,
    pub max_orders: i32,
}

/// Body for POST /schedule/slots.
#[derive(Debug, Deserialize)]
pub struct AddSlotRequest {
    pub date: NaiveDate,
    pub hour: u32,
    /// Falls back to the date's displayed order limit when omitted.
    pub max_orders: Option<i32>,
}

/// Query params for DELETE /schedule/slots/{id}.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteSlotQuery {
    #[serde(default)]
    pub confirm: bool,
}
