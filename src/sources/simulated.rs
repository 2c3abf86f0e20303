use futures::future::BoxFuture;
use rand::seq::IndexedRandom;

use super::{CaptureError, EmotionSource, Modality};

/// Stand-in for a camera or microphone classifier: draws uniformly from the
/// modality's label vocabulary.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    modality: Modality,
}

impl SimulatedSource {
    pub fn new(modality: Modality) -> Self {
        Self { modality }
    }

    fn draw(&self) -> Result<String, CaptureError> {
        let mut rng = rand::rng();
        self.modality
            .vocabulary()
            .choose(&mut rng)
            .map(|label| label.to_string())
            .ok_or(CaptureError::Empty)
    }
}

impl EmotionSource for SimulatedSource {
    fn modality(&self) -> Modality {
        self.modality
    }

    fn capture(&self) -> BoxFuture<'_, Result<String, CaptureError>> {
        let label = self.draw();
        Box::pin(async move { label })
    }
}
