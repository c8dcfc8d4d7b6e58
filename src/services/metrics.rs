use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref SCHEDULE_EDITS_COUNTER: CounterVec = register_counter_vec!(
        "schedule_edits_total",
        "Schedule mutations by action and outcome",
        &["action", "status"]
    ).unwrap();

    pub static ref SCHEDULE_REJECTIONS_COUNTER: CounterVec = register_counter_vec!(
        "schedule_rejections_total",
        "Schedule edits refused before reaching the store",
        &["action", "reason"]
    ).unwrap();

    pub static ref SCHEDULE_FETCH_FAILURES_COUNTER: CounterVec = register_counter_vec!(
        "schedule_fetch_failures_total",
        "Fetches that degraded to an empty result",
        &["what"]
    ).unwrap();
}

pub const FETCH_MONTH_SLOTS: &str = "month_slots";
pub const FETCH_DAY_SLOTS: &str = "day_slots";
pub const FETCH_ORDER_COUNTS: &str = "order_counts";
pub const FETCH_DAY_ORDERS: &str = "day_orders";
pub const FETCH_BOOKABLE_SLOTS: &str = "bookable_slots";

const FETCH_SOURCES: [&str; 5] = [
    FETCH_MONTH_SLOTS,
    FETCH_DAY_SLOTS,
    FETCH_ORDER_COUNTS,
    FETCH_DAY_ORDERS,
    FETCH_BOOKABLE_SLOTS,
];

/// Registers every schedule family and creates its known series at zero.
/// A counter vec without series is left out of `gather()`.
pub fn register(rejections: &[(&str, &str)]) {
    for &(action, reason) in rejections {
        SCHEDULE_REJECTIONS_COUNTER.with_label_values(&[action, reason]);
        for status in ["ok", "error"] {
            SCHEDULE_EDITS_COUNTER.with_label_values(&[action, status]);
        }
    }
    for what in FETCH_SOURCES {
        SCHEDULE_FETCH_FAILURES_COUNTER.with_label_values(&[what]);
    }
}

pub fn record_edit(action: &str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    SCHEDULE_EDITS_COUNTER.with_label_values(&[action, status]).inc();
}

pub fn record_rejection(action: &str, reason: &str) {
    SCHEDULE_REJECTIONS_COUNTER.with_label_values(&[action, reason]).inc();
}

pub fn record_fetch_failure(what: &str) {
    SCHEDULE_FETCH_FAILURES_COUNTER.with_label_values(&[what]).inc();
}
