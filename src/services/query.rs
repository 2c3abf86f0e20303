use std::sync::Arc;

use tracing::warn;

use crate::cognitive::{CognitiveState, PersistenceSink, StateStore};

#[derive(Debug, Clone, PartialEq)]
pub enum StateLookup {
    /// Served from the in-memory store, including the initializing default.
    Live(Arc<CognitiveState>),
    /// Served from the last on-disk snapshot.
    Snapshot(CognitiveState),
    NoData,
}

impl StateLookup {
    pub fn state(&self) -> Option<&CognitiveState> {
        match self {
            Self::Live(state) => Some(state),
            Self::Snapshot(state) => Some(state),
            Self::NoData => None,
        }
    }
}

/// Current state for a reader. The in-memory store wins whenever it exists;
/// the snapshot file is only consulted without one.
pub async fn get_state(store: Option<&StateStore>, sink: &PersistenceSink) -> StateLookup {
    if let Some(store) = store {
        return StateLookup::Live(store.read());
    }

    match sink.load_snapshot().await {
        Ok(Some(state)) => StateLookup::Snapshot(state),
        Ok(None) => StateLookup::NoData,
        Err(e) => {
            warn!(error = %e, path = %sink.snapshot_path().display(), "Unreadable state snapshot");
            StateLookup::NoData
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognitive::{CognitiveStatus, FusedScores, PersistenceConfig};
    use chrono::Utc;
    use tempfile::TempDir;

    async fn sink(dir: &TempDir) -> PersistenceSink {
        PersistenceSink::open(PersistenceConfig {
            snapshot_path: dir.path().join("realtime_data.json"),
            history_path: dir.path().join("cycle_log.jsonl"),
            history_max_records: 0,
        })
        .await
    }

    #[tokio::test]
    async fn test_store_before_first_cycle_is_initializing() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).await;
        let store = StateStore::new();

        let lookup = get_state(Some(&store), &sink).await;
        assert!(matches!(lookup, StateLookup::Live(_)));
        assert_eq!(lookup.state().unwrap().status, CognitiveStatus::Initializing);
    }

    #[tokio::test]
    async fn test_store_wins_over_snapshot() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).await;
        let on_disk = CognitiveState::from_cycle(Utc::now(), "sad", "sad", FusedScores::neutral());
        sink.snapshot(&on_disk).await.unwrap();

        let store = StateStore::new();
        let lookup = get_state(Some(&store), &sink).await;
        assert_eq!(lookup.state().unwrap().face, "neutral");
    }

    #[tokio::test]
    async fn test_without_store_reads_snapshot() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).await;
        let on_disk = CognitiveState::from_cycle(Utc::now(), "calm", "neu", FusedScores::neutral());
        sink.snapshot(&on_disk).await.unwrap();

        assert_eq!(get_state(None, &sink).await, StateLookup::Snapshot(on_disk));
    }

    #[tokio::test]
    async fn test_without_store_or_snapshot_is_no_data() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).await;
        assert_eq!(get_state(None, &sink).await, StateLookup::NoData);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_no_data() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir).await;
        std::fs::write(sink.snapshot_path(), "{ truncated").unwrap();
        assert_eq!(get_state(None, &sink).await, StateLookup::NoData);
    }
}
