use chrono::{DateTime, Local, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FACE_LABEL: &str = "neutral";
pub const DEFAULT_VOICE_LABEL: &str = "neu";
pub const NEUTRAL_SCORE: f64 = 0.5;

const PENDING_TIME: &str = "--:--";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveStatus {
    #[default]
    Initializing,
    Active,
}

impl CognitiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedScores {
    pub stress: f64,
    pub fatigue: f64,
    pub attention: f64,
}

impl FusedScores {
    /// Fallback used when fusion fails.
    pub fn neutral() -> Self {
        Self {
            stress: NEUTRAL_SCORE,
            fatigue: NEUTRAL_SCORE,
            attention: NEUTRAL_SCORE,
        }
    }
}

/// The published result of one cycle.
///
/// Wire names follow the dashboard contract: `time`, `face`, `voice`,
/// `stress`, `fatigue`, `attention`, `status`. `timestamp` is the UTC instant
/// of the cycle and is absent until the first cycle completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveState {
    pub time: String,
    pub face: String,
    pub voice: String,
    pub stress: f64,
    pub fatigue: f64,
    pub attention: f64,
    #[serde(default)]
    pub status: CognitiveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CognitiveState {
    pub fn initializing() -> Self {
        Self {
            time: PENDING_TIME.to_string(),
            face: DEFAULT_FACE_LABEL.to_string(),
            voice: DEFAULT_VOICE_LABEL.to_string(),
            stress: NEUTRAL_SCORE,
            fatigue: NEUTRAL_SCORE,
            attention: NEUTRAL_SCORE,
            status: CognitiveStatus::Initializing,
            timestamp: None,
        }
    }

    pub fn from_cycle(
        now: DateTime<Utc>,
        face: impl Into<String>,
        voice: impl Into<String>,
        scores: FusedScores,
    ) -> Self {
        let now = now.trunc_subsecs(0);
        Self {
            time: now.with_timezone(&Local).format("%H:%M:%S").to_string(),
            face: face.into(),
            voice: voice.into(),
            stress: scores.stress,
            fatigue: scores.fatigue,
            attention: scores.attention,
            status: CognitiveStatus::Active,
            timestamp: Some(now),
        }
    }

    pub fn scores(&self) -> FusedScores {
        FusedScores {
            stress: self.stress,
            fatigue: self.fatigue,
            attention: self.attention,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CognitiveStatus::Active
    }
}

impl Default for CognitiveState {
    fn default() -> Self {
        Self::initializing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initializing_defaults() {
        let state = CognitiveState::initializing();
        assert_eq!(state.status, CognitiveStatus::Initializing);
        assert_eq!(state.face, "neutral");
        assert_eq!(state.voice, "neu");
        assert_eq!(state.scores(), FusedScores::neutral());
        assert!(state.timestamp.is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let state = CognitiveState::from_cycle(
            Utc::now(),
            "happy",
            "neu",
            FusedScores { stress: 0.25, fatigue: 0.4, attention: 0.68 },
        );
        let value = serde_json::to_value(&state).unwrap();
        for key in ["time", "face", "voice", "stress", "fatigue", "attention", "status", "timestamp"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["status"], "active");
        assert_eq!(state.time.len(), 8);
    }

    #[test]
    fn test_parses_snapshot_without_timestamp() {
        let raw = r#"{"time":"10:00:00","face":"sad","voice":"neu","stress":0.6,"fatigue":0.65,"attention":0.38,"status":"active"}"#;
        let state: CognitiveState = serde_json::from_str(raw).unwrap();
        assert!(state.is_active());
        assert!(state.timestamp.is_none());
    }

    #[test]
    fn test_missing_status_defaults_to_initializing() {
        let raw = r#"{"time":"--:--","face":"neutral","voice":"neu","stress":0.5,"fatigue":0.5,"attention":0.5}"#;
        let state: CognitiveState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.status, CognitiveStatus::default());
        assert_eq!(state.status.as_str(), "initializing");
    }
}
