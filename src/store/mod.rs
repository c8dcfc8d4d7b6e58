//! Persistence seam for schedule slots and the orders booked against them.
//!
//! Production traffic goes through [`crate::db::schedule::PgScheduleStore`];
//! [`memory::MemoryScheduleStore`] backs tests and `STORE_BACKEND=memory`.

pub mod memory;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    order::CustomerOrder,
    schedule::{NewScheduleSlot, ScheduleSlot},
};

pub use memory::MemoryScheduleStore;

/// Insert hit the `(schedule_date, schedule_time)` uniqueness rule. Stores
/// return it inside their `anyhow::Error` so callers can `downcast_ref` it.
#[derive(Debug, Error)]
#[error("a slot already exists on {date} at {time}")]
pub struct DuplicateSlotError {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Cheap connectivity check for /health.
    async fn ping(&self) -> anyhow::Result<()>;

    /// Slots with `start <= date <= end`, ordered by date then time.
    async fn slots_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleSlot>>;

    /// Slots on exactly one date, ordered by time.
    async fn slots_on(&self, date: NaiveDate) -> anyhow::Result<Vec<ScheduleSlot>>;

    /// Fails with [`DuplicateSlotError`] when the date already has a slot at that time.
    async fn insert_slot(&self, slot: NewScheduleSlot) -> anyhow::Result<ScheduleSlot>;

    /// Sets `is_available` on every listed slot; returns the number of rows touched.
    async fn update_availability(&self, ids: &[Uuid], available: bool) -> anyhow::Result<u64>;

    /// Sets `max_orders` on every listed slot; returns the number of rows touched.
    async fn update_capacity(&self, ids: &[Uuid], max_orders: i32) -> anyhow::Result<u64>;

    /// Returns the removed row, `None` when no slot had that id.
    async fn delete_slot(&self, id: Uuid) -> anyhow::Result<Option<ScheduleSlot>>;

    /// Orders whose `schedule_id` is one of `ids`, joined to customer name and slot time.
    async fn orders_for_slots(&self, ids: &[Uuid]) -> anyhow::Result<Vec<CustomerOrder>>;
}
