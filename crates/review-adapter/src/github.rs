use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use review_core::error::ReviewError;

const STAGE: &str = "posting";

/// The downstream source-control API boundary (spec §4.7: "the
/// comment-poster's authentication to the source-control API" is explicitly
/// out of scope). Abstracted as a trait so `routes::post_comment`'s own
/// request-shape handling is testable against a fake, the same way
/// `review-scan::rpc::ScanBackend` isolates the scanning RPC.
#[async_trait]
pub trait SourceControlApi: Send + Sync {
    async fn post_comment(&self, owner: &str, repo: &str, pr_number: i64, body: &str) -> Result<(), ReviewError>;
}

/// A minimal GitHub issue-comments client. Bearer token is optional —
/// absent credential is not itself an error here either, mirroring the
/// scan RPC's own auth posture (spec §4.4 "Authentication").
pub struct GitHubCommentApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubCommentApi {
    /// `base_url` defaults to the real GitHub API in production
    /// (`GitHubCommentApi::new(http, None, token)`); tests inject a local
    /// one-shot server instead.
    pub fn new(http: reqwest::Client, base_url: Option<String>, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| "https://api.github.com".to_string()),
            token,
        }
    }
}

#[async_trait]
impl SourceControlApi for GitHubCommentApi {
    async fn post_comment(&self, owner: &str, repo: &str, pr_number: i64, body: &str) -> Result<(), ReviewError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/issues/{pr_number}/comments",
            self.base_url.trim_end_matches('/')
        );

        let mut builder = self
            .http
            .post(&url)
            .header("User-Agent", "review-adapter")
            .json(&json!({ "body": body }));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(owner, repo, pr_number, error = %e, "source-control API unreachable");
            ReviewError::with_source(STAGE, review_core::error::ErrorKind::Transport, "source-control API unreachable", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::protocol(STAGE, format!("source-control API returned status {status}")));
        }

        Ok(())
    }
}
