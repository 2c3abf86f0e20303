use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "cogstate";
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, Error)]
pub enum LogFileError {
    #[error("failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open rolling log file: {0}")]
    Appender(#[from] InitError),
}

/// Flushes buffered file output when dropped.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Daily `cogstate.<date>.log` files under `dir`, creating the directory first.
pub fn daily_log_file(dir: &Path) -> Result<RollingFileAppender, LogFileError> {
    std::fs::create_dir_all(dir).map_err(|source| LogFileError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)?;
    Ok(appender)
}

/// Installs the global subscriber from `RUST_LOG`, plus the rolling file
/// layer when `ENABLE_FILE_LOGS` is set. Keep the returned guard alive for
/// the lifetime of the process.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match config.file_log_dir().map(daily_log_file) {
        Some(Ok(appender)) => Some(tracing_appender::non_blocking(appender)),
        Some(Err(err)) => {
            // No subscriber yet.
            eprintln!("file logging disabled: {err}");
            None
        }
        None => None,
    };
    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
            Some(FileLogGuard { _guard: guard }),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    tracing::debug!(
        level = %config.log_level,
        log_dir = ?config.file_log_dir(),
        capture = config.capture_enabled,
        "tracing initialised"
    );
    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_daily_log_file_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("logs").join("cogstate");
        let appender = daily_log_file(&nested);
        assert!(appender.is_ok());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_daily_log_file_rejects_file_in_the_way() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, b"not a directory").unwrap();
        assert!(matches!(
            daily_log_file(&blocker),
            Err(LogFileError::Directory { .. })
        ));
    }
}
