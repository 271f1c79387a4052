use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use review_core::types::Finding;

/// The scanning boundary abstracted as a trait so the fallback algorithm
/// (`crate::algorithm`) can be exercised against a hand-written fake
/// instead of a real remote scanning tool (spec §4.4: "the boundary that
/// makes this code testable in isolation").
#[async_trait]
pub trait ScanBackend: Send + Sync {
    async fn semgrep_scan(
        &self,
        code_files: &[CodeFileEntry<'_>],
        config: &str,
    ) -> Result<Vec<Finding>, ScanAttemptError>;
}

/// A single attempt against one scan configuration failed — either the
/// transport itself, a non-2xx response, or a malformed nested payload
/// (spec §4.4: "a missing `content` array or a non-JSON text field is a
/// transport error for that attempt"). The caller treats all of these
/// identically: remember it, move on to the next configuration.
#[derive(Debug)]
pub struct ScanAttemptError {
    pub config: String,
    pub message: String,
}

pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    bearer: Option<String>,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: ToolCallParams<'a>,
}

#[derive(Serialize)]
struct ToolCallParams<'a> {
    name: &'static str,
    arguments: ToolCallArguments<'a>,
}

#[derive(Serialize)]
struct ToolCallArguments<'a> {
    code_files: &'a [CodeFileEntry<'a>],
    config: &'a str,
}

#[derive(Serialize)]
pub struct CodeFileEntry<'a> {
    pub filename: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<ToolCallResult>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    message: String,
}

#[derive(Deserialize)]
struct ToolCallResult {
    #[serde(default)]
    content: Vec<ToolCallContent>,
}

#[derive(Deserialize)]
struct ToolCallContent {
    #[serde(default)]
    text: String,
}

/// The nested payload carried inside `result.content[0].text`.
#[derive(Deserialize)]
struct ScanToolPayload {
    #[serde(default)]
    results: Vec<RawFinding>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Deserialize)]
struct RawFinding {
    check_id: String,
    path: String,
    start: RawStart,
    extra: RawExtra,
}

#[derive(Deserialize)]
struct RawStart {
    line: u32,
}

#[derive(Deserialize)]
struct RawExtra {
    severity: String,
    message: String,
    #[serde(default)]
    lines: String,
}

impl RpcClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, bearer: Option<String>) -> Self {
        Self { http, url: url.into(), bearer }
    }
}

#[async_trait]
impl ScanBackend for RpcClient {
    /// Issues one `tools/call` RPC for `config` against the full set of
    /// collected files. Findings are returned even if the tool's own
    /// `errors` array is non-empty — that array is advisory, not fatal,
    /// per the RPC contract in spec §4.4.
    async fn semgrep_scan(
        &self,
        code_files: &[CodeFileEntry<'_>],
        config: &str,
    ) -> Result<Vec<Finding>, ScanAttemptError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "tools/call",
            params: ToolCallParams {
                name: "semgrep_scan",
                arguments: ToolCallArguments { code_files, config },
            },
        };

        let mut builder = self.http.post(&self.url).json(&request);
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| ScanAttemptError {
            config: config.to_string(),
            message: format!("transport error: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanAttemptError {
                config: config.to_string(),
                message: format!("scanning tool returned status {status}"),
            });
        }

        let parsed: JsonRpcResponse = response.json().await.map_err(|e| ScanAttemptError {
            config: config.to_string(),
            message: format!("unparseable RPC envelope: {e}"),
        })?;

        if let Some(error) = parsed.error {
            return Err(ScanAttemptError {
                config: config.to_string(),
                message: format!("RPC error: {}", error.message),
            });
        }

        let result = parsed.result.ok_or_else(|| ScanAttemptError {
            config: config.to_string(),
            message: "RPC response carried neither result nor error".to_string(),
        })?;

        let text = result
            .content
            .first()
            .map(|c| c.text.as_str())
            .ok_or_else(|| ScanAttemptError {
                config: config.to_string(),
                message: "RPC result missing content array".to_string(),
            })?;

        let payload: ScanToolPayload = serde_json::from_str(text).map_err(|e| ScanAttemptError {
            config: config.to_string(),
            message: format!("content text is not valid JSON: {e}"),
        })?;

        if !payload.errors.is_empty() {
            warn!(config, errors = ?payload.errors, "semgrep_scan reported tool-level errors alongside results");
        }

        Ok(payload
            .results
            .into_iter()
            .map(|r| Finding {
                rule_id: r.check_id,
                path: r.path,
                start_line: r.start.line,
                severity: r.extra.severity,
                message: r.extra.message,
                excerpt: r.extra.lines.lines().next().unwrap_or("").trim().to_string(),
            })
            .collect())
    }
}
