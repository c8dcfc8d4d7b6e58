use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{
        order::CustomerOrder,
        schedule::{NewScheduleSlot, ScheduleSlot},
    },
    store::{DuplicateSlotError, ScheduleStore},
};

const SLOT_COLUMNS: &str = "schedule_id, schedule_date, schedule_time, max_orders, is_available";
const SLOT_UNIQUE_CONSTRAINT: &str = "schedule_date_time_key";

/// Schedule and order rows living in PostgreSQL.
#[derive(Clone)]
pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn slots_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<ScheduleSlot>> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            r#"SELECT {SLOT_COLUMNS}
               FROM schedule
               WHERE schedule_date >= $1 AND schedule_date <= $2
               ORDER BY schedule_date, schedule_time"#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    async fn slots_on(&self, date: NaiveDate) -> anyhow::Result<Vec<ScheduleSlot>> {
        let slots = sqlx::query_as::<_, ScheduleSlot>(&format!(
            r#"SELECT {SLOT_COLUMNS}
               FROM schedule
               WHERE schedule_date = $1
               ORDER BY schedule_time"#
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    async fn insert_slot(&self, slot: NewScheduleSlot) -> anyhow::Result<ScheduleSlot> {
        let row = sqlx::query_as::<_, ScheduleSlot>(&format!(
            r#"INSERT INTO schedule (schedule_date, schedule_time, max_orders, is_available)
               VALUES ($1, $2, $3, $4)
               RETURNING {SLOT_COLUMNS}"#
        ))
        .bind(slot.schedule_date)
        .bind(slot.schedule_time)
        .bind(slot.max_orders)
        .bind(slot.is_available)
        .fetch_one(&self.pool)
        .await;

        match row {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db))
                if db.is_unique_violation() && db.constraint() == Some(SLOT_UNIQUE_CONSTRAINT) =>
            {
                Err(DuplicateSlotError {
                    date: slot.schedule_date,
                    time: slot.schedule_time,
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_availability(&self, ids: &[Uuid], available: bool) -> anyhow::Result<u64> {
        let res = sqlx::query(
            "UPDATE schedule SET is_available = $1, updated_at = NOW() WHERE schedule_id = ANY($2)",
        )
        .bind(available)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn update_capacity(&self, ids: &[Uuid], max_orders: i32) -> anyhow::Result<u64> {
        let res = sqlx::query(
            "UPDATE schedule SET max_orders = $1, updated_at = NOW() WHERE schedule_id = ANY($2)",
        )
        .bind(max_orders)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn delete_slot(&self, id: Uuid) -> anyhow::Result<Option<ScheduleSlot>> {
        let row = sqlx::query_as::<_, ScheduleSlot>(&format!(
            "DELETE FROM schedule WHERE schedule_id = $1 RETURNING {SLOT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn orders_for_slots(&self, ids: &[Uuid]) -> anyhow::Result<Vec<CustomerOrder>> {
        let orders = sqlx::query_as::<_, CustomerOrder>(
            r#"SELECT o.order_id,
                      o.customer_uid,
                      TRIM(CONCAT(c.first_name, ' ',
                                  COALESCE(NULLIF(c.middle_name, '') || ' ', ''),
                                  c.last_name)) AS customer_name,
                      o.schedule_id,
                      s.schedule_time,
                      o.order_status,
                      o.created_at
               FROM orders o
               INNER JOIN customers c ON c.customer_uid = o.customer_uid
               INNER JOIN schedule s ON s.schedule_id = o.schedule_id
               WHERE o.schedule_id = ANY($1)
               ORDER BY s.schedule_time, o.created_at"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
