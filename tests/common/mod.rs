#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use tower::ServiceExt;

use cogstate_backend::cognitive::{PersistenceConfig, PersistenceSink};
use cogstate_backend::sources::{CaptureError, EmotionSource, Modality};

pub async fn open_sink(dir: &Path, max_records: usize) -> Arc<PersistenceSink> {
    Arc::new(
        PersistenceSink::open(PersistenceConfig {
            snapshot_path: dir.join("realtime_data.json"),
            history_path: dir.join("cycle_log.jsonl"),
            history_max_records: max_records,
        })
        .await,
    )
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

/// Source that always returns the same label.
pub struct FixedSource {
    pub modality: Modality,
    pub label: &'static str,
}

impl EmotionSource for FixedSource {
    fn modality(&self) -> Modality {
        self.modality
    }

    fn capture(&self) -> BoxFuture<'_, Result<String, CaptureError>> {
        let label = self.label.to_string();
        Box::pin(async move { Ok(label) })
    }
}

pub fn fixed(modality: Modality, label: &'static str) -> Arc<dyn EmotionSource> {
    Arc::new(FixedSource { modality, label })
}
