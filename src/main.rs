use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_api::{
    build_router,
    config::{Config, StoreBackend},
    db::{self, schedule::PgScheduleStore},
    services::{clock::SystemClock, events::ScheduleEvents},
    store::{MemoryScheduleStore, ScheduleStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn ScheduleStore> = match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(url)) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");
            Arc::new(PgScheduleStore::new(pool))
        }
        (StoreBackend::Postgres, None) => anyhow::bail!("Missing required env var: DATABASE_URL"),
        (StoreBackend::Memory, _) => {
            warn!("Using in-memory schedule store, data is lost on restart");
            Arc::new(MemoryScheduleStore::new())
        }
    };

    let events = match config.redis_url.as_deref() {
        Some(url) => {
            let events = ScheduleEvents::connect(url).await?;
            info!("Redis connected");
            Some(events)
        }
        None => {
            info!("REDIS_URL not set, live schedule updates disabled");
            None
        }
    };

    let state = AppState::new(store, Arc::new(SystemClock), config.clone(), events);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("schedule API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
