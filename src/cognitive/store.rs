use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::types::{CognitiveState, CognitiveStatus};

const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Holds the single current [`CognitiveState`].
///
/// The cycle worker is the only writer. A replacement swaps the whole record
/// behind the lock, so readers observe either the previous or the new state,
/// never a mix of the two.
pub struct StateStore {
    current: RwLock<Arc<CognitiveState>>,
    cycles: AtomicU64,
    updates: broadcast::Sender<Arc<CognitiveState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(Arc::new(CognitiveState::initializing())),
            cycles: AtomicU64::new(0),
            updates,
        }
    }

    pub fn read(&self) -> Arc<CognitiveState> {
        let guard = self.current.read();
        Arc::clone(&*guard)
    }

    pub fn replace(&self, mut next: CognitiveState) -> Arc<CognitiveState> {
        // Once a cycle has completed the status stays active.
        next.status = CognitiveStatus::Active;
        let next = Arc::new(next);

        *self.current.write() = Arc::clone(&next);
        self.cycles.fetch_add(1, Ordering::Release);

        let _ = self.updates.send(Arc::clone(&next));
        next
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CognitiveState>> {
        self.updates.subscribe()
    }
}
