use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::types::CognitiveState;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub snapshot_path: PathBuf,
    pub history_path: PathBuf,
    /// Records kept in the active history log before it is rotated. 0 disables rotation.
    pub history_max_records: usize,
}

/// Current-state snapshot plus the append-only cycle history.
pub struct PersistenceSink {
    config: PersistenceConfig,
    history_records: Mutex<usize>,
}

impl PersistenceSink {
    pub async fn open(config: PersistenceConfig) -> Self {
        // The count only drives rotation.
        let existing = if config.history_max_records > 0 {
            count_records(&config.history_path).await
        } else {
            0
        };
        debug!(path = %config.history_path.display(), records = existing, "history log opened");
        Self {
            config,
            history_records: Mutex::new(existing),
        }
    }

    /// Records in the active log since the last rotation, as tracked for the bound.
    pub async fn active_records(&self) -> usize {
        *self.history_records.lock().await
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.config.snapshot_path
    }

    pub fn history_path(&self) -> &Path {
        &self.config.history_path
    }

    pub fn rotated_history_path(&self) -> PathBuf {
        let mut name = self.config.history_path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    /// Replaces the snapshot file as a whole: written beside the target, then renamed over it.
    pub async fn snapshot(&self, state: &CognitiveState) -> Result<(), PersistenceError> {
        let path = &self.config.snapshot_path;
        let body = serde_json::to_vec_pretty(state)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &body)
            .await
            .map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| PersistenceError::io(path, e))?;
        Ok(())
    }

    pub async fn append(&self, state: &CognitiveState) -> Result<(), PersistenceError> {
        let path = &self.config.history_path;
        let mut line = serde_json::to_string(state)?;
        line.push('\n');

        let mut records = self.history_records.lock().await;
        let max = self.config.history_max_records;
        if max > 0 && *records >= max {
            let rotated = self.rotated_history_path();
            match fs::rename(path, &rotated).await {
                Ok(()) => {
                    info!(rotated = %rotated.display(), records = *records, "history log rotated")
                }
                // Removed externally; start counting again.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        rotated = %rotated.display(),
                        error = %e,
                        "history rotation failed, appending to the active log"
                    );
                }
            }
            *records = 0;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| PersistenceError::io(path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PersistenceError::io(path, e))?;
        file.flush().await.map_err(|e| PersistenceError::io(path, e))?;

        *records += 1;
        Ok(())
    }

    pub async fn load_snapshot(&self) -> Result<Option<CognitiveState>, PersistenceError> {
        let path = &self.config.snapshot_path;
        let raw = match fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(path, e)),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// The last `limit` records, oldest first. Reaches into the rotated log
    /// when the active one holds fewer. Unparseable lines are skipped.
    pub async fn recent_history(&self, limit: usize) -> Result<Vec<CognitiveState>, PersistenceError> {
        let mut records = read_tail(&self.config.history_path, limit).await?;
        if records.len() < limit {
            let mut older = read_tail(&self.rotated_history_path(), limit - records.len()).await?;
            older.append(&mut records);
            records = older;
        }
        Ok(records)
    }
}

async fn count_records(path: &Path) -> usize {
    let Ok(file) = fs::File::open(path).await else {
        return 0;
    };
    let mut lines = BufReader::new(file).lines();
    let mut count = 0;
    while let Ok(Some(line)) = lines.next_line().await {
        if !line.trim().is_empty() {
            count += 1;
        }
    }
    count
}

async fn read_tail(path: &Path, limit: usize) -> Result<Vec<CognitiveState>, PersistenceError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PersistenceError::io(path, e)),
    };

    let mut records: Vec<CognitiveState> = content
        .lines()
        .rev()
        .filter_map(|line| serde_json::from_str(line).ok())
        .take(limit)
        .collect();
    records.reverse();
    Ok(records)
}
