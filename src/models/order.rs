use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An order row joined to its customer's name and its slot's time.
/// Only used for display in the day-detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CustomerOrder {
    pub order_id: Uuid,
    pub customer_uid: Uuid,
    pub customer_name: String,
    pub schedule_id: Uuid,
    pub schedule_time: NaiveTime,
    pub order_status: String,
    pub created_at: DateTime<Utc>,
}
