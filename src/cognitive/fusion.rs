use rand::Rng;
use thiserror::Error;

use super::types::{FusedScores, NEUTRAL_SCORE};

pub const DEFAULT_JITTER: f64 = 0.05;
pub const MAX_JITTER: f64 = 0.5;

// Face labels (FER) and voice labels (wav2vec2 superb-er) share one table.
const STRESS_WEIGHTS: &[(&str, f64)] = &[
    ("angry", 0.9),
    ("ang", 0.9),
    ("fear", 0.8),
    ("fea", 0.8),
    ("sad", 0.7),
    ("surprise", 0.5),
    ("neutral", 0.4),
    ("neu", 0.3),
    ("hap", 0.3),
    ("happy", 0.2),
    ("calm", 0.2),
];

const FATIGUE_WEIGHTS: &[(&str, f64)] = &[
    ("sad", 0.8),
    ("neutral", 0.6),
    ("fear", 0.6),
    ("fea", 0.6),
    ("angry", 0.5),
    ("ang", 0.5),
    ("neu", 0.5),
    ("calm", 0.4),
    ("surprise", 0.4),
    ("happy", 0.3),
    ("hap", 0.3),
];

#[derive(Debug, Error, PartialEq)]
pub enum FusionError {
    #[error("non-finite {field} value")]
    NonFinite { field: &'static str },
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

fn lookup(table: &[(&str, f64)], label: &str) -> f64 {
    let label = normalize_label(label);
    table
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, weight)| *weight)
        .unwrap_or(NEUTRAL_SCORE)
}

pub fn stress_weight(label: &str) -> f64 {
    lookup(STRESS_WEIGHTS, label)
}

pub fn fatigue_weight(label: &str) -> f64 {
    lookup(FATIGUE_WEIGHTS, label)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Attention as stored: derived from the stored (clamped, rounded) stress and fatigue.
pub fn attention_from(stress: f64, fatigue: f64) -> f64 {
    round2((1.0 - (stress + fatigue) / 2.0).clamp(0.0, 1.0))
}

/// Label-symmetric fusion: each score is the mean of the face and voice
/// weights, optionally perturbed by a symmetric jitter and clamped to [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct FusionEngine {
    jitter: f64,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER)
    }
}

impl FusionEngine {
    /// Finite jitter is clamped to `[0, MAX_JITTER]`. A non-finite jitter is
    /// kept and reported by [`FusionEngine::fuse`] as a fusion error.
    pub fn new(jitter: f64) -> Self {
        let jitter = if jitter.is_finite() {
            jitter.clamp(0.0, MAX_JITTER)
        } else {
            jitter
        };
        Self { jitter }
    }

    pub fn deterministic() -> Self {
        Self { jitter: 0.0 }
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn fuse(&self, face: &str, voice: &str) -> Result<FusedScores, FusionError> {
        let mut rng = rand::rng();
        self.fuse_with_rng(face, voice, &mut rng)
    }

    pub fn fuse_with_rng<R: Rng>(
        &self,
        face: &str,
        voice: &str,
        rng: &mut R,
    ) -> Result<FusedScores, FusionError> {
        let mut stress = (stress_weight(face) + stress_weight(voice)) / 2.0;
        let mut fatigue = (fatigue_weight(face) + fatigue_weight(voice)) / 2.0;

        if !self.jitter.is_finite() {
            return Err(FusionError::NonFinite { field: "jitter" });
        }
        if self.jitter > 0.0 {
            stress += rng.random_range(-self.jitter..=self.jitter);
            fatigue += rng.random_range(-self.jitter..=self.jitter);
        }

        let stress = round2(finite("stress", stress)?.clamp(0.0, 1.0));
        let fatigue = round2(finite("fatigue", fatigue)?.clamp(0.0, 1.0));

        Ok(FusedScores {
            stress,
            fatigue,
            attention: attention_from(stress, fatigue),
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, FusionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FusionError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_happy_neu_example() {
        let scores = FusionEngine::deterministic().fuse("happy", "neu").unwrap();
        assert!(close(scores.stress, 0.25));
        assert!(close(scores.fatigue, 0.4));
        assert!(close(scores.attention, attention_from(0.25, 0.4)));
    }

    #[test]
    fn test_labels_are_normalized() {
        let engine = FusionEngine::deterministic();
        assert_eq!(
            engine.fuse("  ANGRY ", "Ang").unwrap(),
            engine.fuse("angry", "ang").unwrap()
        );
    }

    #[test]
    fn test_unknown_labels_are_neutral() {
        let scores = FusionEngine::deterministic().fuse("disgust", "xyz").unwrap();
        assert_eq!(scores, FusedScores::neutral());
    }

    #[test]
    fn test_angry_more_stressed_than_happy() {
        let engine = FusionEngine::deterministic();
        let angry = engine.fuse("angry", "ang").unwrap();
        let happy = engine.fuse("happy", "hap").unwrap();
        assert!(angry.stress > happy.stress);
    }

    #[test]
    fn test_jitter_stays_bounded() {
        let engine = FusionEngine::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let scores = engine.fuse_with_rng("happy", "neu", &mut rng).unwrap();
            assert!(scores.stress >= 0.2 - 1e-9 && scores.stress <= 0.3 + 1e-9);
            assert!(scores.fatigue >= 0.35 - 1e-9 && scores.fatigue <= 0.45 + 1e-9);
            assert!(close(scores.attention, attention_from(scores.stress, scores.fatigue)));
        }
    }

    #[test]
    fn test_large_jitter_is_clamped() {
        let engine = FusionEngine::new(MAX_JITTER);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let scores = engine.fuse_with_rng("angry", "ang", &mut rng).unwrap();
            assert!((0.0..=1.0).contains(&scores.stress));
            assert!((0.0..=1.0).contains(&scores.fatigue));
            assert!((0.0..=1.0).contains(&scores.attention));
        }
    }

    #[test]
    fn test_out_of_range_jitter_is_clamped() {
        assert_eq!(FusionEngine::new(f64::MAX).jitter(), MAX_JITTER);
        assert_eq!(FusionEngine::new(-1.0).jitter(), 0.0);

        let engine = FusionEngine::new(f64::MAX);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let scores = engine.fuse_with_rng("happy", "neu", &mut rng).unwrap();
            assert!((0.0..=1.0).contains(&scores.stress));
            assert!((0.0..=1.0).contains(&scores.fatigue));
        }
    }

    #[test]
    fn test_nan_jitter_is_an_error() {
        let result = FusionEngine::new(f64::NAN).fuse("happy", "neu");
        assert!(matches!(result, Err(FusionError::NonFinite { .. })));
    }

    #[test]
    fn test_infinite_jitter_is_an_error() {
        let result = FusionEngine::new(f64::INFINITY).fuse("happy", "neu");
        assert!(result.is_err());
    }
}
