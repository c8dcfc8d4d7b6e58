// Library exports for the API binary, tools and tests
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use middleware::auth::JwtSecret;
use services::{clock::Clock, events::ScheduleEvents, schedule::ScheduleEditor};
use store::ScheduleStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    pub clock: Arc<dyn Clock>,
    pub editor: ScheduleEditor,
    pub config: Arc<Config>,
    pub events: Option<ScheduleEvents>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
        config: Arc<Config>,
        events: Option<ScheduleEvents>,
    ) -> Self {
        let editor = ScheduleEditor::new(store.clone(), clock.clone(), config.default_max_orders);
        Self {
            store,
            clock,
            editor,
            config,
            events,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Allow the web client origin; localhost is always allowed for development.
    let base = state.config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Schedule screens (admin read-only, staff editable)
        .route("/schedule/calendar", get(routes::schedule::get_calendar))
        .route("/schedule/day", get(routes::schedule::get_day))
        .route("/schedule/day/availability", put(routes::schedule::set_availability))
        .route("/schedule/day/capacity", put(routes::schedule::set_capacity))
        .route("/schedule/slots", post(routes::schedule::add_slot))
        .route("/schedule/slots/{id}", delete(routes::schedule::delete_slot))
        // Checkout
        .route("/schedule/bookable", get(routes::booking::list_bookable))
        .route("/schedule/resolve", post(routes::booking::resolve))
        // Live month updates
        .route("/ws/schedule", get(routes::websocket::ws_handler))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
