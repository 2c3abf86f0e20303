use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};

use crate::cognitive::CognitiveState;
use crate::response::AppError;
use crate::services::query::{get_state, StateLookup};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 60;
const MAX_HISTORY_LIMIT: usize = 1000;
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct NoDataResponse {
    error: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

pub async fn current_state(State(state): State<AppState>) -> Response {
    let store = state.store();
    let sink = state.sink();

    match get_state(store.as_deref(), &sink).await {
        StateLookup::Live(current) => Json(current.as_ref().clone()).into_response(),
        StateLookup::Snapshot(snapshot) => Json(snapshot).into_response(),
        StateLookup::NoData => Json(NoDataResponse {
            error: "No data yet",
        })
        .into_response(),
    }
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(AppError::bad_request(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}"
        )));
    }

    let records = state
        .sink()
        .recent_history(limit)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(SuccessResponse {
        success: true,
        data: records,
    }))
}

pub async fn stream_state(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let store = state
        .store()
        .ok_or_else(|| AppError::not_found("Live updates are unavailable in reader-only mode"))?;

    // Subscribe before reading so no replacement falls between the two.
    let updates = BroadcastStream::new(store.subscribe()).filter_map(|msg| async move {
        msg.ok().map(|s| Ok::<Event, Infallible>(state_event(&s)))
    });
    let current = store.read();
    let initial = stream::once(async move { Ok::<Event, Infallible>(state_event(&current)) });

    let start = tokio::time::Instant::now() + PING_INTERVAL;
    let pings = IntervalStream::new(tokio::time::interval_at(start, PING_INTERVAL))
        .map(|_| Ok::<Event, Infallible>(ping_event()));

    Ok(Sse::new(initial.chain(stream::select(updates, pings))))
}

fn state_event(state: &CognitiveState) -> Event {
    let data = serde_json::to_string(state).unwrap_or_else(|_| "{}".to_string());
    Event::default().event("state").data(data)
}

fn ping_event() -> Event {
    let payload = serde_json::json!({ "timestamp": chrono::Utc::now().to_rfc3339() });
    Event::default().event("ping").data(payload.to_string())
}
