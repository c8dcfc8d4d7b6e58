use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DuplicateSlotError, ScheduleStore};
use crate::models::{
    order::CustomerOrder,
    schedule::{NewScheduleSlot, ScheduleSlot},
};

/// In-process store. Slots keep insertion order, which is what "fetch order"
/// means for this backend once results are sorted by date and time.
#[derive(Default)]
pub struct MemoryScheduleStore {
    slots: RwLock<Vec<ScheduleSlot>>,
    orders: RwLock<Vec<CustomerOrder>>,
    /// Number of calls that reached the store, reads and writes alike.
    pub calls: AtomicU64,
    /// Number of insert/update/delete calls.
    pub writes: AtomicU64,
    /// When set, every call fails as if the backend were unreachable.
    pub fail: AtomicBool,
    /// When set, only order lookups fail.
    pub fail_orders: AtomicBool,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: Vec<ScheduleSlot>) -> Self {
        Self {
            slots: RwLock::new(slots),
            ..Self::default()
        }
    }

    /// Adds an order row, as if a customer had checked out against `schedule_id`.
    pub async fn push_order(&self, order: CustomerOrder) {
        self.orders.write().await.push(order);
    }

    pub async fn all_slots(&self) -> Vec<ScheduleSlot> {
        self.slots.read().await.clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_orders_failing(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn enter(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("memory store is unavailable");
        }
        Ok(())
    }

    fn enter_write(&self) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.enter()
    }
}

fn sorted(mut slots: Vec<ScheduleSlot>) -> Vec<ScheduleSlot> {
    slots.sort_by_key(|s| (s.schedule_date, s.schedule_time));
    slots
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.enter()
    }

    async fn slots_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleSlot>> {
        self.enter()?;
        let slots = self.slots.read().await;
        Ok(sorted(
            slots
                .iter()
                .filter(|s| s.schedule_date >= start && s.schedule_date <= end)
                .cloned()
                .collect(),
        ))
    }

    async fn slots_on(&self, date: NaiveDate) -> anyhow::Result<Vec<ScheduleSlot>> {
        self.slots_between(date, date).await
    }

    async fn insert_slot(&self, slot: NewScheduleSlot) -> anyhow::Result<ScheduleSlot> {
        self.enter_write()?;
        let mut slots = self.slots.write().await;
        if slots
            .iter()
            .any(|s| s.schedule_date == slot.schedule_date && s.schedule_time == slot.schedule_time)
        {
            return Err(DuplicateSlotError {
                date: slot.schedule_date,
                time: slot.schedule_time,
            }
            .into());
        }
        let row = ScheduleSlot {
            schedule_id: Uuid::new_v4(),
            schedule_date: slot.schedule_date,
            schedule_time: slot.schedule_time,
            max_orders: slot.max_orders,
            is_available: slot.is_available,
        };
        slots.push(row.clone());
        Ok(row)
    }

    async fn update_availability(&self, ids: &[Uuid], available: bool) -> anyhow::Result<u64> {
        self.enter_write()?;
        let mut touched = 0;
        for slot in self.slots.write().await.iter_mut() {
            if ids.contains(&slot.schedule_id) {
                slot.is_available = available;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn update_capacity(&self, ids: &[Uuid], max_orders: i32) -> anyhow::Result<u64> {
        self.enter_write()?;
        let mut touched = 0;
        for slot in self.slots.write().await.iter_mut() {
            if ids.contains(&slot.schedule_id) {
                slot.max_orders = max_orders;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete_slot(&self, id: Uuid) -> anyhow::Result<Option<ScheduleSlot>> {
        self.enter_write()?;
        let mut slots = self.slots.write().await;
        let idx = slots.iter().position(|s| s.schedule_id == id);
        Ok(idx.map(|i| slots.remove(i)))
    }

    async fn orders_for_slots(&self, ids: &[Uuid]) -> anyhow::Result<Vec<CustomerOrder>> {
        self.enter()?;
        if self.fail_orders.load(Ordering::SeqCst) {
            anyhow::bail!("order lookup is unavailable");
        }
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| ids.contains(&o.schedule_id))
            .cloned()
            .collect())
    }
}
