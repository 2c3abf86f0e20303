use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cognitive::fusion::{DEFAULT_JITTER, MAX_JITTER};
use crate::cognitive::PersistenceConfig;

const DEFAULT_CYCLE_PERIOD_SECS: u64 = 60;
const DEFAULT_CAPTURE_TIMEOUT_SECS: u64 = 20;
// One week of history at the default period.
const DEFAULT_HISTORY_MAX_RECORDS: usize = 7 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
    pub capture_enabled: bool,
    pub cycle_period: Duration,
    pub capture_timeout: Duration,
    pub face_capture_cmd: Option<String>,
    pub voice_capture_cmd: Option<String>,
    pub fusion_jitter: f64,
    pub snapshot_path: PathBuf,
    pub history_path: PathBuf,
    pub history_max_records: usize,
    pub dashboard_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5000,
            log_level: "info".to_string(),
            file_logs: false,
            log_dir: PathBuf::from("./logs"),
            capture_enabled: true,
            cycle_period: Duration::from_secs(DEFAULT_CYCLE_PERIOD_SECS),
            capture_timeout: Duration::from_secs(DEFAULT_CAPTURE_TIMEOUT_SECS),
            face_capture_cmd: None,
            voice_capture_cmd: None,
            fusion_jitter: DEFAULT_JITTER,
            snapshot_path: PathBuf::from("realtime_data.json"),
            history_path: PathBuf::from("cycle_log.jsonl"),
            history_max_records: DEFAULT_HISTORY_MAX_RECORDS,
            dashboard_path: PathBuf::from("static/dashboard.html"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let cycle_period = env_secs("CYCLE_PERIOD_SECS").unwrap_or(defaults.cycle_period);
        let capture_timeout = env_secs("CAPTURE_TIMEOUT_SECS").unwrap_or(defaults.capture_timeout);

        let fusion_jitter = std::env::var("FUSION_JITTER")
            .ok()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, MAX_JITTER))
            .unwrap_or(defaults.fusion_jitter);

        let history_max_records = std::env::var("HISTORY_MAX_RECORDS")
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(defaults.history_max_records);

        Self {
            host,
            port,
            log_level,
            file_logs: env_bool("ENABLE_FILE_LOGS").unwrap_or(defaults.file_logs),
            log_dir: env_string("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir),
            capture_enabled: env_bool("CAPTURE_ENABLED").unwrap_or(defaults.capture_enabled),
            cycle_period,
            capture_timeout,
            face_capture_cmd: env_string("FACE_CAPTURE_CMD"),
            voice_capture_cmd: env_string("VOICE_CAPTURE_CMD"),
            fusion_jitter,
            snapshot_path: env_string("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            history_path: env_string("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_path),
            history_max_records,
            dashboard_path: env_string("DASHBOARD_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.dashboard_path),
        }
    }

    /// Directory for the rolling log file, when file logging is on.
    pub fn file_log_dir(&self) -> Option<&Path> {
        self.file_logs.then_some(self.log_dir.as_path())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig {
            snapshot_path: self.snapshot_path.clone(),
            history_path: self.history_path.clone(),
            history_max_records: self.history_max_records,
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_string(key)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cycle_period, Duration::from_secs(60));
        assert_eq!(config.bind_addr().port(), 5000);
        assert!(config.capture_enabled);
        assert_eq!(config.persistence().history_max_records, 10_080);
        assert!(config.file_log_dir().is_none());
    }

    #[test]
    fn test_from_env_overrides_and_rejects_invalid() {
        std::env::set_var("CYCLE_PERIOD_SECS", "120");
        std::env::set_var("CAPTURE_TIMEOUT_SECS", "0");
        std::env::set_var("FUSION_JITTER", "3.0");
        std::env::set_var("FACE_CAPTURE_CMD", "  ");
        std::env::set_var("ENABLE_FILE_LOGS", "yes");
        std::env::set_var("LOG_DIR", "/var/log/cogstate");
        let config = Config::from_env();
        std::env::remove_var("CYCLE_PERIOD_SECS");
        std::env::remove_var("CAPTURE_TIMEOUT_SECS");
        std::env::remove_var("FUSION_JITTER");
        std::env::remove_var("FACE_CAPTURE_CMD");
        std::env::remove_var("ENABLE_FILE_LOGS");
        std::env::remove_var("LOG_DIR");

        assert_eq!(config.cycle_period, Duration::from_secs(120));
        assert_eq!(config.capture_timeout, Duration::from_secs(20));
        assert_eq!(config.fusion_jitter, MAX_JITTER);
        assert!(config.face_capture_cmd.is_none());
        assert_eq!(config.file_log_dir(), Some(Path::new("/var/log/cogstate")));
    }
}
