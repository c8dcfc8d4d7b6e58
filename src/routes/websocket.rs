use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    middleware::auth::decode_access_token,
    models::calendar::{MonthRef, MonthSnapshot},
    services::{
        events::ScheduleChanged,
        refresh::{FetchGeneration, FetchTicket},
        schedule::ScheduleEditor,
    },
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct WsQueryParams {
    pub token: String,
    pub year: i32,
    /// Zero-based.
    pub month: u32,
}

/// GET /ws/schedule?token=..&year=..&month=.. — pushes the month grid again
/// whenever a slot of that month changes. Token, role and month are checked
/// before the upgrade itself.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsQueryParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let user = match decode_access_token(&params.token, &state.config.jwt_secret) {
        Ok(user) => user,
        Err(e) => {
            error!("WebSocket auth failed: {}", e);
            return (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response();
        }
    };
    if !user.role.can_view_schedule() {
        return (StatusCode::FORBIDDEN, "Access denied").into_response();
    }
    let month = match MonthRef::new(params.year, params.month) {
        Ok(month) => month,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    ws.on_upgrade(move |socket| async move {
        info!("Schedule WebSocket connected: user={} month={}", user.user_id, month);
        handle_socket(socket, state, month).await;
    })
}

async fn handle_socket(socket: WebSocket, state: AppState, month: MonthRef) {
    let (mut sender, mut receiver) = socket.split();

    let generation = Arc::new(FetchGeneration::new());
    let (tx, mut rx) = mpsc::unbounded_channel::<(FetchTicket, MonthSnapshot)>();

    spawn_refetch(&state.editor, month, &generation, &tx);

    let pubsub = match &state.events {
        Some(events) => match events.subscribe().await {
            Ok(pubsub) => Some(pubsub),
            Err(e) => {
                error!("Redis pubsub error: {}", e);
                None
            }
        },
        None => None,
    };

    // Redis change notifications → refetch of the watched month
    let editor = state.editor.clone();
    let notify_generation = generation.clone();
    let mut notify_task = tokio::spawn(async move {
        let Some(mut pubsub) = pubsub else {
            std::future::pending::<()>().await;
            return;
        };
        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(_) => continue,
            };
            match serde_json::from_str::<ScheduleChanged>(&payload) {
                Ok(change) if change.affects(month) => {
                    spawn_refetch(&editor, month, &notify_generation, &tx);
                }
                Ok(_) => {}
                Err(e) => warn!("Ignoring malformed schedule change: {}", e),
            }
        }
    });

    // Refetch results → WebSocket, newest fetch only
    let mut forward_task = tokio::spawn(async move {
        while let Some((ticket, snapshot)) = rx.recv().await {
            if !generation.is_current(ticket) {
                debug!("Dropping stale month snapshot for {}", snapshot.month);
                continue;
            }
            let ws_msg = serde_json::json!({
                "type": "schedule_month",
                "payload": snapshot,
            });
            if sender
                .send(Message::Text(ws_msg.to_string().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    let mut client_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut notify_task) => {}
        _ = (&mut forward_task) => {}
        _ = (&mut client_task) => {}
    }
    notify_task.abort();
    forward_task.abort();
    client_task.abort();

    info!("Schedule WebSocket disconnected");
}

fn spawn_refetch(
    editor: &ScheduleEditor,
    month: MonthRef,
    generation: &FetchGeneration,
    tx: &mpsc::UnboundedSender<(FetchTicket, MonthSnapshot)>,
) {
    let ticket = generation.begin();
    let editor = editor.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let snapshot = editor.load_month(month, None).await;
        let _ = tx.send((ticket, snapshot));
    });
}
