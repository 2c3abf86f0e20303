use axum::extract::State;
use axum::response::Html;
use tracing::warn;

use crate::response::AppError;
use crate::state::AppState;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let path = state.dashboard_path();
    tokio::fs::read_to_string(path).await.map(Html).map_err(|e| {
        warn!(error = %e, path = %path.display(), "Dashboard unavailable");
        AppError::not_found("Dashboard not found")
    })
}
