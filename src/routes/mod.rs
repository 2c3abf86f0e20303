mod cognitive;
mod dashboard;
mod health;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/api/state", get(cognitive::current_state))
        .route("/api/state/stream", get(cognitive::stream_state))
        .route("/api/history", get(cognitive::history))
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("Endpoint not found").into_response()
}
