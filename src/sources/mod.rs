mod command;
mod simulated;

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::info;

use crate::cognitive::types::{DEFAULT_FACE_LABEL, DEFAULT_VOICE_LABEL};

pub use command::CommandSource;
pub use simulated::SimulatedSource;

pub const FACE_VOCABULARY: &[&str] = &["angry", "fear", "sad", "neutral", "happy", "surprise", "calm"];
pub const VOICE_VOCABULARY: &[&str] = &["neu", "hap", "sad", "ang", "fea"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Face,
    Voice,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Voice => "voice",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Face => DEFAULT_FACE_LABEL,
            Self::Voice => DEFAULT_VOICE_LABEL,
        }
    }

    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            Self::Face => FACE_VOCABULARY,
            Self::Voice => VOICE_VOCABULARY,
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no result within {0:?}")]
    Timeout(std::time::Duration),
    #[error("failed to start classifier: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("classifier failed: {0}")]
    Failed(String),
    #[error("classifier returned no label")]
    Empty,
}

/// A capture function returning one emotion label per call.
///
/// Implementations report failures instead of substituting a default; the
/// cycle worker decides the fallback label.
pub trait EmotionSource: Send + Sync {
    fn modality(&self) -> Modality;

    fn capture(&self) -> BoxFuture<'_, Result<String, CaptureError>>;
}

/// External classifier when a command is configured, simulated labels otherwise.
pub fn source_for(modality: Modality, command_line: Option<&str>) -> Arc<dyn EmotionSource> {
    match command_line.and_then(|cmd| CommandSource::parse(modality, cmd)) {
        Some(source) => {
            info!(modality = modality.as_str(), program = source.program(), "Using external classifier");
            Arc::new(source)
        }
        None => {
            info!(modality = modality.as_str(), "No classifier configured, using simulated labels");
            Arc::new(SimulatedSource::new(modality))
        }
    }
}
