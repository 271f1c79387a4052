use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use review_core::types::{CodeFileMap, SeverityCounts};
use review_scan::ScanBackend;

pub struct AppState {
    pub backend: Arc<dyn ScanBackend>,
    pub configs: Vec<String>,
    pub bearer_configured: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "semgrep",
        "scan_config_count": state.configs.len(),
        "bearer_configured": state.bearer_configured,
    }))
}

#[derive(Deserialize)]
pub struct ScanRequest {
    pub repo_path: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub repo_url: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub branch: Option<String>,
    pub files: HashMap<String, String>,
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub status: String,
    pub findings_markdown: String,
    pub severity: SeverityCounts,
    pub findings_count: u32,
    pub scan_duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn scan(State(state): State<Arc<AppState>>, Json(body): Json<ScanRequest>) -> Json<ScanResponse> {
    let start = std::time::Instant::now();

    let files: CodeFileMap = body.files.into_iter().map(|(path, content)| (path, content.into_bytes())).collect();

    tracing::info!(repo_path = %body.repo_path, file_count = files.len(), "scan request received");

    let result = review_scan::scan(state.backend.as_ref(), &files, &state.configs).await;

    Json(ScanResponse {
        status: result.status.to_string(),
        findings_markdown: result.findings_markdown,
        severity: result.severity,
        findings_count: result.findings_count,
        scan_duration: start.elapsed().as_secs_f64(),
        error: result.error,
    })
}
