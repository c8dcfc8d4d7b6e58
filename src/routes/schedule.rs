use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    middleware::auth::{require_schedule_editor, require_schedule_viewer},
    models::{
        auth::AuthenticatedUser,
        calendar::{CalendarQuery, DayQuery, MonthRef},
        schedule::{AddSlotRequest, DeleteSlotQuery, SetAvailabilityRequest, SetCapacityRequest},
    },
    services::{
        events::ScheduleChanged,
        schedule::{EditOutcome, ScheduleError},
    },
    AppState,
};

type ApiError = (StatusCode, Json<Value>);

/// GET /schedule/calendar?year=2025&month=4&selected=17 — admin and staff
pub async fn get_calendar(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<Value>, ApiError> {
    require_schedule_viewer(&user)?;
    let month = MonthRef::new(params.year, params.month)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))?;

    let snapshot = state.editor.load_month(month, params.selected).await;
    Ok(Json(json!({
        "month": snapshot.month,
        "label": snapshot.label,
        "days": snapshot.days,
        "editable": user.role.can_edit_schedule(),
    })))
}

/// GET /schedule/day?date=YYYY-MM-DD — admin and staff
pub async fn get_day(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<DayQuery>,
) -> Result<Json<Value>, ApiError> {
    require_schedule_viewer(&user)?;
    let day = state.editor.load_day(params.date).await;
    Ok(Json(json!(day)))
}

/// PUT /schedule/day/availability — staff only
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, ApiError> {
    require_schedule_editor(&user)?;
    let outcome = state
        .editor
        .set_availability(body.date, body.is_available)
        .await
        .map_err(edit_error)?;
    Ok(Json(finish_edit(&state, "availability", outcome).await))
}

/// PUT /schedule/day/capacity — staff only
pub async fn set_capacity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<SetCapacityRequest>,
) -> Result<Json<Value>, ApiError> {
    require_schedule_editor(&user)?;
    let outcome = state
        .editor
        .set_capacity(body.date, body.max_orders)
        .await
        .map_err(edit_error)?;
    Ok(Json(finish_edit(&state, "capacity", outcome).await))
}

/// POST /schedule/slots — staff only
pub async fn add_slot(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<AddSlotRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_schedule_editor(&user)?;
    let outcome = state
        .editor
        .add_slot(body.date, body.hour, body.max_orders)
        .await
        .map_err(edit_error)?;
    Ok((StatusCode::CREATED, Json(finish_edit(&state, "add_slot", outcome).await)))
}

/// DELETE /schedule/slots/{id}?confirm=true — staff only
pub async fn delete_slot(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteSlotQuery>,
) -> Result<Json<Value>, ApiError> {
    require_schedule_editor(&user)?;
    let outcome = state
        .editor
        .delete_slot(id, params.confirm)
        .await
        .map_err(edit_error)?;
    Ok(Json(finish_edit(&state, "delete_slot", outcome).await))
}

async fn finish_edit(state: &AppState, action: &str, outcome: EditOutcome) -> Value {
    if let Some(events) = &state.events {
        events
            .publish(&ScheduleChanged {
                date: outcome.date,
                action: action.to_string(),
            })
            .await;
    }
    json!({
        "slot": outcome.slot,
        "date": outcome.date,
        "month": outcome.month,
    })
}

pub fn edit_error(e: ScheduleError) -> ApiError {
    let (status, code) = match &e {
        ScheduleError::NoSlotsForDate(_) => (StatusCode::CONFLICT, "no_slots"),
        ScheduleError::DuplicateSlot { .. } => (StatusCode::CONFLICT, "duplicate_slot"),
        ScheduleError::InvalidCapacity(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_capacity"),
        ScheduleError::InvalidHour(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_hour"),
        ScheduleError::ConfirmationRequired => {
            (StatusCode::PRECONDITION_REQUIRED, "confirmation_required")
        }
        ScheduleError::SlotNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        ScheduleError::SlotUnavailable => (StatusCode::CONFLICT, "slot_unavailable"),
        ScheduleError::Store { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
    };
    (status, Json(json!({ "error": e.to_string(), "code": code })))
}
