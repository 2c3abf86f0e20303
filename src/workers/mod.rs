mod cycle;

pub use cycle::{next_delay, CycleReport, CycleSettings, CycleWorker};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Owns the background cycle task and its shutdown signal.
pub struct WorkerManager {
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn start(&self, worker: CycleWorker) -> Result<(), WorkerError> {
        let mut slot = self.handle.lock();
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(WorkerError::AlreadyRunning);
        }

        let period = worker.settings().period;
        let shutdown_rx = self.shutdown_tx.subscribe();
        *slot = Some(tokio::spawn(worker.run(shutdown_rx)));
        info!(period_secs = period.as_secs(), "Cycle worker scheduled");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub async fn stop(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };

        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());

        match handle.await {
            Ok(()) => info!("Workers stopped"),
            Err(e) if e.is_panic() => error!(error = %e, "Cycle worker panicked"),
            Err(e) => warn!(error = %e, "Cycle worker did not stop cleanly"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("cycle worker already running")]
    AlreadyRunning,
}
