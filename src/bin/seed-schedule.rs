//! Schedule seed script
//!
//! Creates the standard hourly slots (09:00–17:00) on every day of a month,
//! skipping slots that already exist, and optionally prints a staff token
//! for trying the API by hand.
//!
//! Usage:
//!   DATABASE_URL=... ./seed-schedule --year 2025 --month 5 --max-orders 30
//!   JWT_SECRET=... ./seed-schedule --year 2025 --month 5 --print-token

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveTime, Weekday};
use clap::Parser;
use uuid::Uuid;

use schedule_api::{
    db::{self, schedule::PgScheduleStore},
    middleware::auth::encode_access_token,
    models::{
        calendar::MonthRef,
        schedule::{NewScheduleSlot, STAFF_HOURS},
        user::UserRole,
    },
    services::calendar::days_in_month,
    store::ScheduleStore,
};

#[derive(Debug, Parser)]
#[command(about = "Seed hourly schedule slots for one month")]
struct Args {
    #[arg(long)]
    year: i32,
    /// Calendar month, 1-12
    #[arg(long)]
    month: u32,
    #[arg(long, default_value_t = 30)]
    max_orders: i32,
    /// Leave Sundays without slots
    #[arg(long)]
    skip_sundays: bool,
    /// Print a 24h staff access token signed with JWT_SECRET
    #[arg(long)]
    print_token: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let month0 = args.month.checked_sub(1).context("month must be 1-12")?;
    let month = MonthRef::new(args.year, month0)?;
    anyhow::ensure!(args.max_orders > 0, "--max-orders must be positive");
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;

    println!("=== Seed schedule for {month} ===");

    let pool = db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool).await?;
    let store = PgScheduleStore::new(pool);

    let existing: HashSet<_> = store
        .slots_between(month.first_day(), month.last_day())
        .await?
        .into_iter()
        .map(|s| (s.schedule_date, s.schedule_time))
        .collect();

    let mut created = 0usize;
    let mut skipped = 0usize;
    for day in 1..=days_in_month(month) {
        let Some(date) = month.day(day) else { continue };
        if args.skip_sundays && date.weekday() == Weekday::Sun {
            continue;
        }
        for hour in STAFF_HOURS {
            let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else { continue };
            if existing.contains(&(date, time)) {
                skipped += 1;
                continue;
            }
            store
                .insert_slot(NewScheduleSlot {
                    schedule_date: date,
                    schedule_time: time,
                    max_orders: args.max_orders,
                    is_available: true,
                })
                .await
                .with_context(|| format!("Failed to insert slot {date} {time}"))?;
            created += 1;
        }
    }
    println!("  Created {created} slot(s), {skipped} already present");

    if args.print_token {
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET required for --print-token")?;
        let token = encode_access_token(Uuid::new_v4(), UserRole::Staff, &secret, 24 * 3600)?;
        println!("  Staff token: {token}");
    }

    Ok(())
}
