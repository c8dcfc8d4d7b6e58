use std::collections::HashMap;

use tracing::error;
use uuid::Uuid;

use crate::{
    models::{order::CustomerOrder, schedule::ScheduleSlot},
    services::metrics,
    store::ScheduleStore,
};

/// Orders per schedule slot. A missing key means zero.
pub type OrderCounts = HashMap<Uuid, i64>;

pub fn count_by_slot<'a, I>(orders: I) -> OrderCounts
where
    I: IntoIterator<Item = &'a CustomerOrder>,
{
    let mut counts = OrderCounts::new();
    for order in orders {
        *counts.entry(order.schedule_id).or_insert(0) += 1;
    }
    counts
}

pub struct OrderAggregator;

impl OrderAggregator {
    /// Counts orders for the given slots. A failed fetch is logged and
    /// reported as no orders at all; nothing is retried.
    pub async fn counts(store: &dyn ScheduleStore, slot_ids: &[Uuid]) -> OrderCounts {
        if slot_ids.is_empty() {
            return OrderCounts::new();
        }
        match store.orders_for_slots(slot_ids).await {
            Ok(orders) => count_by_slot(&orders),
            Err(e) => {
                error!("Error fetching order counts for {} slot(s): {e:#}", slot_ids.len());
                metrics::record_fetch_failure(metrics::FETCH_ORDER_COUNTS);
                OrderCounts::new()
            }
        }
    }

    /// Orders booked on the given slots of one day, for the detail panel.
    pub async fn orders_for_day(
        store: &dyn ScheduleStore,
        slots_of_day: &[ScheduleSlot],
    ) -> Vec<CustomerOrder> {
        if slots_of_day.is_empty() {
            return Vec::new();
        }
        let ids: Vec<Uuid> = slots_of_day.iter().map(|s| s.schedule_id).collect();
        match store.orders_for_slots(&ids).await {
            Ok(orders) => orders,
            Err(e) => {
                error!("Error fetching orders for day: {e:#}");
                metrics::record_fetch_failure(metrics::FETCH_DAY_ORDERS);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};

    fn order(schedule_id: Uuid) -> CustomerOrder {
        CustomerOrder {
            order_id: Uuid::new_v4(),
            customer_uid: Uuid::new_v4(),
            customer_name: "Ana Cruz".into(),
            schedule_id,
            schedule_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            order_status: "Pending".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counts_group_by_slot() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let orders = vec![order(a), order(b), order(a), order(a)];
        let counts = count_by_slot(&orders);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&a], 3);
        assert_eq!(counts[&b], 1);
    }

    #[test]
    fn no_orders_no_keys() {
        assert!(count_by_slot(&Vec::<CustomerOrder>::new()).is_empty());
    }
}
