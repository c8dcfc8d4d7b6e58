use chrono::NaiveDate;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::calendar::MonthRef;

/// Redis channel carrying schedule change notifications.
pub const SCHEDULE_CHANNEL: &str = "schedule:changes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleChanged {
    pub date: NaiveDate,
    pub action: String,
}

impl ScheduleChanged {
    /// Whether a screen showing `month` has to reload.
    pub fn affects(&self, month: MonthRef) -> bool {
        month.contains(self.date)
    }
}

/// Publishes and subscribes to schedule changes over Redis pub/sub.
#[derive(Clone)]
pub struct ScheduleEvents {
    pub client: redis::Client,
    conn: redis::aio::MultiplexedConnection,
}

impl ScheduleEvents {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { client, conn })
    }

    /// Best effort: a failed publish only means listeners refresh later.
    pub async fn publish(&self, event: &ScheduleChanged) {
        let payload = serde_json::to_string(event).unwrap_or_default();
        let mut conn = self.conn.clone();
        if let Err(e) = conn.publish::<_, _, ()>(SCHEDULE_CHANNEL, &payload).await {
            warn!("schedule change publish failed: {e}");
        }
    }

    pub async fn subscribe(&self) -> anyhow::Result<redis::aio::PubSub> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(SCHEDULE_CHANNEL).await?;
        Ok(pubsub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(json: &str) -> ScheduleChanged {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn only_changes_inside_the_watched_month_trigger_a_reload() {
        let may = MonthRef::new(2025, 4).unwrap();

        assert!(change(r#"{"date":"2025-05-01","action":"add_slot"}"#).affects(may));
        assert!(change(r#"{"date":"2025-05-31","action":"capacity"}"#).affects(may));
        assert!(!change(r#"{"date":"2025-06-01","action":"add_slot"}"#).affects(may));
        assert!(!change(r#"{"date":"2024-05-17","action":"delete_slot"}"#).affects(may));
    }
}
