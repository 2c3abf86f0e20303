use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::cognitive::{PersistenceSink, StateStore};
use crate::workers::WorkerManager;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    store: Option<Arc<StateStore>>,
    sink: Arc<PersistenceSink>,
    workers: Option<Arc<WorkerManager>>,
    dashboard_path: PathBuf,
}

impl AppState {
    /// `store` and `workers` are `None` in reader-only mode, where state is
    /// served from the snapshot file written by another process.
    pub fn new(
        store: Option<Arc<StateStore>>,
        sink: Arc<PersistenceSink>,
        workers: Option<Arc<WorkerManager>>,
        dashboard_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            store,
            sink,
            workers,
            dashboard_path: dashboard_path.into(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn store(&self) -> Option<Arc<StateStore>> {
        self.store.clone()
    }

    pub fn sink(&self) -> Arc<PersistenceSink> {
        Arc::clone(&self.sink)
    }

    pub fn workers(&self) -> Option<Arc<WorkerManager>> {
        self.workers.clone()
    }

    pub fn scheduler_running(&self) -> bool {
        self.workers.as_ref().is_some_and(|w| w.is_running())
    }

    pub fn dashboard_path(&self) -> &Path {
        &self.dashboard_path
    }
}
