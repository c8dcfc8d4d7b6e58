use std::{env, ops::RangeInclusive};

use crate::models::schedule::DEFAULT_MAX_ORDERS;

/// Accepted values of `BOOKING_HORIZON_DAYS`.
pub const BOOKING_HORIZON_RANGE: RangeInclusive<i64> = 1..=366;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub app_base_url: String,
    pub default_max_orders: i32,
    pub booking_horizon_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") | Err(_) => StoreBackend::Postgres,
            Ok(other) => anyhow::bail!("Unknown STORE_BACKEND: {other}"),
        };
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("Missing required env var: DATABASE_URL");
        }

        let default_max_orders: i32 = env::var("DEFAULT_MAX_ORDERS")
            .unwrap_or_else(|_| DEFAULT_MAX_ORDERS.to_string())
            .parse()?;
        anyhow::ensure!(default_max_orders > 0, "DEFAULT_MAX_ORDERS must be positive");

        Ok(Self {
            store_backend,
            database_url,
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: required("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            default_max_orders,
            booking_horizon_days: booking_horizon(
                &env::var("BOOKING_HORIZON_DAYS").unwrap_or_else(|_| "60".into()),
            )?,
        })
    }

    /// Settings for tests and local tooling: in-memory store, no Redis.
    pub fn for_memory(jwt_secret: &str) -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            redis_url: None,
            jwt_secret: jwt_secret.to_string(),
            host: "127.0.0.1".into(),
            port: 0,
            app_base_url: "http://localhost:5173".into(),
            default_max_orders: DEFAULT_MAX_ORDERS,
            booking_horizon_days: 60,
        }
    }
}

fn booking_horizon(raw: &str) -> anyhow::Result<i64> {
    let days: i64 = raw
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("BOOKING_HORIZON_DAYS is not a number: {e}"))?;
    anyhow::ensure!(
        BOOKING_HORIZON_RANGE.contains(&days),
        "BOOKING_HORIZON_DAYS must be between {} and {}, got {days}",
        BOOKING_HORIZON_RANGE.start(),
        BOOKING_HORIZON_RANGE.end()
    );
    Ok(days)
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
