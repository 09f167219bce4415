use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

// Best-effort telemetry for one session's aggregation run. Overwritten at
// each stage, read by the progress endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: String,
    pub progress: u8,
    pub message: String,
    pub timestamp: u64,
}

impl ProgressUpdate {
    pub fn idle() -> Self {
        Self {
            stage: "idle".to_string(),
            progress: 0,
            message: "no analysis in progress".to_string(),
            timestamp: now_millis(),
        }
    }
}

// Per-session progress map, owned by the request-handling layer and passed
// by reference into the pipeline. No process-wide globals.
#[derive(Clone, Default)]
pub struct ProgressStore {
    inner: Arc<RwLock<HashMap<String, ProgressUpdate>>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, session: &str, stage: &str, progress: u8, message: &str) {
        let update = ProgressUpdate {
            stage: stage.to_string(),
            progress: progress.min(100),
            message: message.to_string(),
            timestamp: now_millis(),
        };
        self.inner.write().await.insert(session.to_string(), update);
    }

    pub async fn get(&self, session: &str) -> Option<ProgressUpdate> {
        self.inner.read().await.get(session).cloned()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
