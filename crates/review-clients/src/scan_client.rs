use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use review_core::clients::{ScanClient, ScanOutcome};
use review_core::error::ReviewError;
use review_core::types::{CodeFileMap, PrMetadata, SeverityCounts};

/// The orchestrator's view of the Security Scan Service: a plain HTTP
/// forward of the collected file map to a distinct deployed process
/// (spec §4.8). The scan algorithm itself — configuration fallback,
/// severity normalization, markdown shaping — lives entirely inside that
/// process (`review-scan`), not here.
pub struct ScanServiceClient {
    http: reqwest::Client,
    url: String,
}

impl ScanServiceClient {
    /// `url` is the service's base URL; `/scan` is appended per request.
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    repo_path: &'a str,
    repo_url: Option<String>,
    branch: &'a str,
    files: HashMap<String, String>,
}

#[derive(Deserialize)]
struct ScanResponse {
    #[allow(dead_code)]
    status: String,
    findings_markdown: String,
    severity: SeverityCounts,
    #[allow(dead_code)]
    findings_count: u32,
    #[allow(dead_code)]
    scan_duration: f64,
    #[allow(dead_code)]
    error: Option<String>,
}

#[async_trait]
impl ScanClient for ScanServiceClient {
    async fn scan(&self, pr: &PrMetadata, files: &CodeFileMap) -> Result<ScanOutcome, ReviewError> {
        let endpoint = format!("{}/scan", self.url.trim_end_matches('/'));
        info!(pr_number = pr.pr_number, stage = "scan", file_count = files.len(), url = %endpoint, "calling scan service");

        let body = ScanRequest {
            repo_path: &pr.local_path,
            repo_url: None,
            branch: &pr.source_branch,
            files: files
                .iter()
                .map(|(path, content)| (path.clone(), String::from_utf8_lossy(content).into_owned()))
                .collect(),
        };

        let response = self.http.post(&endpoint).json(&body).send().await.map_err(|e| {
            warn!(pr_number = pr.pr_number, stage = "scan", error = %e, "scan service unreachable");
            ReviewError::with_source("scan", review_core::error::ErrorKind::Transport, "scan service unreachable", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::protocol("scan", format!("scan service returned status {status}")));
        }

        let parsed: ScanResponse = response.json().await.map_err(|e| {
            ReviewError::with_source("scan", review_core::error::ErrorKind::Protocol, "unparseable scan service response", e)
        })?;

        // The service's own `status`/`error` fields already encode its
        // internal recoverable-failure handling (spec §4.4 step 3); the
        // orchestrator only cares that it got a usable markdown + severity
        // pair back, regardless of which branch produced it.
        Ok(ScanOutcome {
            markdown: parsed.findings_markdown,
            severity: parsed.severity,
        })
    }
}
