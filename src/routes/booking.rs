use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    models::auth::AuthenticatedUser,
    routes::schedule::edit_error,
    services::booking::{resolve_slot, BookingService},
    AppState,
};

/// GET /schedule/bookable — open dates and times for checkout
pub async fn list_bookable(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Json<Value> {
    let dates = BookingService::list(
        state.store.as_ref(),
        state.clock.today(),
        state.config.booking_horizon_days,
    )
    .await;
    Json(json!(dates))
}

#[derive(Debug, Deserialize)]
pub struct ResolveSlotRequest {
    pub date: NaiveDate,
    /// As displayed, e.g. "2:00 PM"
    pub time: String,
}

/// POST /schedule/resolve — map the picked date and time back to a schedule id
pub async fn resolve(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<ResolveSlotRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let dates = BookingService::list(
        state.store.as_ref(),
        state.clock.today(),
        state.config.booking_horizon_days,
    )
    .await;
    let slot = resolve_slot(&dates, body.date, &body.time).map_err(edit_error)?;
    Ok(Json(json!(slot)))
}
