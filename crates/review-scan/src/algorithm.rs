use tracing::{info, warn};

use review_core::types::{CodeFileMap, SeverityCounts};

use crate::markdown;
use crate::rpc::{CodeFileEntry, ScanBackend};
use crate::severity;

/// The Security Scan Service's own outcome shape (spec §6 `/scan` response),
/// distinct from `review_core::clients::ScanOutcome` which is only the
/// subset the orchestrator forwards on.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub status: &'static str,
    pub findings_markdown: String,
    pub severity: SeverityCounts,
    pub findings_count: u32,
    pub error: Option<String>,
}

/// Implements spec §4.4 steps 1–5: empty-input short circuit, ordered
/// configuration fallback, and the three terminal shapes (failure-heuristic,
/// clean, or real findings).
pub async fn scan(backend: &dyn ScanBackend, files: &CodeFileMap, configs: &[String]) -> ScanResult {
    if files.is_empty() {
        info!(stage = "scan", "empty file map, skipping remote scan entirely");
        return ScanResult {
            status: "success",
            findings_markdown: markdown::no_code_files(),
            severity: SeverityCounts::zero(),
            findings_count: 0,
            error: None,
        };
    }

    let owned_contents: Vec<(String, String)> = files
        .iter()
        .map(|(path, bytes)| (path.clone(), String::from_utf8_lossy(bytes).into_owned()))
        .collect();
    let entries: Vec<CodeFileEntry> = owned_contents
        .iter()
        .map(|(path, content)| CodeFileEntry { filename: path, content })
        .collect();

    let mut last_error: Option<String> = None;

    for config in configs {
        match backend.semgrep_scan(&entries, config).await {
            Ok(findings) if !findings.is_empty() => {
                info!(config = %config, finding_count = findings.len(), "scan configuration produced findings, stopping fallback");
                let counts = severity::counts(&findings);
                return ScanResult {
                    status: "success",
                    findings_markdown: markdown::render(&findings, counts),
                    severity: counts,
                    findings_count: findings.len() as u32,
                    error: None,
                };
            }
            Ok(_) => {
                info!(config = %config, "scan configuration produced no findings, trying next");
            }
            Err(e) => {
                warn!(config = %config, error = %e.message, "scan configuration attempt failed, trying next");
                last_error = Some(e.message);
            }
        }
    }

    match last_error {
        Some(message) => {
            warn!(stage = "scan", "all configurations exhausted with at least one transport error, returning heuristic result");
            ScanResult {
                status: "error",
                findings_markdown: markdown::scanning_failed(),
                severity: SeverityCounts::zero(),
                findings_count: 0,
                error: Some(message),
            }
        }
        None => ScanResult {
            status: "success",
            findings_markdown: markdown::no_issues_found(),
            severity: SeverityCounts::zero(),
            findings_count: 0,
            error: None,
        },
    }
}
