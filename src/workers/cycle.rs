use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cognitive::{CognitiveState, FusedScores, FusionEngine, PersistenceSink, StateStore};
use crate::sources::{CaptureError, EmotionSource};

#[derive(Debug, Clone, Copy)]
pub struct CycleSettings {
    pub period: Duration,
    pub capture_timeout: Duration,
}

/// Outcome of one capture-fuse-publish-persist iteration.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub state: Arc<CognitiveState>,
    pub face_fallback: bool,
    pub voice_fallback: bool,
    pub fusion_fallback: bool,
    pub persistence_failures: usize,
    pub elapsed: Duration,
}

/// Sleep before the next iteration so that iterations start `period` apart.
/// Work that overruns the period starts the next iteration immediately.
pub fn next_delay(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

pub struct CycleWorker {
    settings: CycleSettings,
    face: Arc<dyn EmotionSource>,
    voice: Arc<dyn EmotionSource>,
    engine: FusionEngine,
    store: Arc<StateStore>,
    sink: Arc<PersistenceSink>,
}

impl CycleWorker {
    pub fn new(
        settings: CycleSettings,
        face: Arc<dyn EmotionSource>,
        voice: Arc<dyn EmotionSource>,
        engine: FusionEngine,
        store: Arc<StateStore>,
        sink: Arc<PersistenceSink>,
    ) -> Self {
        Self {
            settings,
            face,
            voice,
            engine,
            store,
            sink,
        }
    }

    pub fn settings(&self) -> CycleSettings {
        self.settings
    }

    /// Runs iterations until `shutdown` fires. The signal is only observed
    /// between iterations; an iteration in progress always completes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            period_secs = self.settings.period.as_secs_f64(),
            capture_timeout_secs = self.settings.capture_timeout.as_secs_f64(),
            "Cycle worker started"
        );

        loop {
            let report = self.run_once().await;
            let delay = next_delay(self.settings.period, report.elapsed);
            debug!(sleep_secs = format!("{:.1}", delay.as_secs_f64()), "Waiting for next cycle");

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(cycles = self.store.cycles_completed(), "Cycle worker stopped");
    }

    pub async fn run_once(&self) -> CycleReport {
        let start = Instant::now();
        let now = Utc::now();

        let (face, face_fallback) = self.capture(self.face.as_ref()).await;
        let (voice, voice_fallback) = self.capture(self.voice.as_ref()).await;

        let (scores, fusion_fallback) = match self.engine.fuse(&face, &voice) {
            Ok(scores) => (scores, false),
            Err(e) => {
                warn!(error = %e, face = %face, voice = %voice, "Fusion failed, using neutral state");
                (FusedScores::neutral(), true)
            }
        };

        let state = self
            .store
            .replace(CognitiveState::from_cycle(now, face, voice, scores));

        let mut persistence_failures = 0;
        if let Err(e) = self.sink.snapshot(&state).await {
            persistence_failures += 1;
            warn!(error = %e, "Failed to write state snapshot");
        }
        if let Err(e) = self.sink.append(&state).await {
            persistence_failures += 1;
            warn!(error = %e, "Failed to append cycle history");
        }

        let elapsed = start.elapsed();
        info!(
            face = %state.face,
            voice = %state.voice,
            stress = state.stress,
            fatigue = state.fatigue,
            attention = state.attention,
            duration_secs = format!("{:.2}", elapsed.as_secs_f64()),
            "Cycle completed"
        );

        CycleReport {
            state,
            face_fallback,
            voice_fallback,
            fusion_fallback,
            persistence_failures,
            elapsed,
        }
    }

    /// Returns the captured label, or the modality default and `true` on failure.
    async fn capture(&self, source: &dyn EmotionSource) -> (String, bool) {
        let modality = source.modality();
        let timeout = self.settings.capture_timeout;

        let result = match tokio::time::timeout(timeout, source.capture()).await {
            Ok(Ok(label)) => {
                let label = label.trim();
                if label.is_empty() {
                    Err(CaptureError::Empty)
                } else {
                    Ok(label.to_string())
                }
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CaptureError::Timeout(timeout)),
        };

        match result {
            Ok(label) => {
                debug!(modality = modality.as_str(), label = %label, "Captured emotion");
                (label, false)
            }
            Err(e) => {
                let fallback = modality.default_label();
                warn!(
                    modality = modality.as_str(),
                    error = %e,
                    fallback,
                    "Capture failed, using default label"
                );
                (fallback.to_string(), true)
            }
        }
    }
}
