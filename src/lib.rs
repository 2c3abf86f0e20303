pub mod cognitive;
pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod sources;
pub mod state;
pub mod workers;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::cognitive::{FusionEngine, PersistenceSink, StateStore};
use crate::config::Config;
use crate::sources::{source_for, Modality};
use crate::state::AppState;
use crate::workers::{CycleSettings, CycleWorker, WorkerError, WorkerManager};

pub fn create_app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Opens persistence and, unless capture is disabled, starts the cycle worker.
pub async fn build_state(config: &Config) -> Result<AppState, WorkerError> {
    let sink = Arc::new(PersistenceSink::open(config.persistence()).await);

    if !config.capture_enabled {
        info!(
            snapshot = %config.snapshot_path.display(),
            "Capture disabled, serving state from snapshot only"
        );
        return Ok(AppState::new(None, sink, None, config.dashboard_path.clone()));
    }

    let store = Arc::new(StateStore::new());
    let worker = CycleWorker::new(
        CycleSettings {
            period: config.cycle_period,
            capture_timeout: config.capture_timeout,
        },
        source_for(Modality::Face, config.face_capture_cmd.as_deref()),
        source_for(Modality::Voice, config.voice_capture_cmd.as_deref()),
        FusionEngine::new(config.fusion_jitter),
        Arc::clone(&store),
        Arc::clone(&sink),
    );

    let workers = Arc::new(WorkerManager::new());
    workers.start(worker)?;

    Ok(AppState::new(
        Some(store),
        sink,
        Some(workers),
        config.dashboard_path.clone(),
    ))
}
