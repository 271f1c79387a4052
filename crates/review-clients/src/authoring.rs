use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use review_core::clients::AuthoringClient;
use review_core::error::ReviewError;
use review_core::types::PrMetadata;

/// The authoring service's two call modes (spec §4.5) share one endpoint
/// and one request/response shape, distinguished only by `mode`.
pub struct PrAgentClient {
    http: reqwest::Client,
    url: String,
}

impl PrAgentClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[derive(Serialize)]
struct AuthoringRequest<'a> {
    mode: &'a str,
    pr: &'a PrMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_markdown: Option<&'a str>,
}

#[derive(Deserialize)]
struct DescribeResponse {
    description_markdown: String,
}

#[derive(Deserialize)]
struct ReviewResponse {
    review_markdown: String,
}

#[async_trait]
impl AuthoringClient for PrAgentClient {
    async fn describe(&self, pr: &PrMetadata) -> Result<String, ReviewError> {
        info!(pr_number = pr.pr_number, stage = "describe", url = %self.url, "calling authoring service");

        let body = AuthoringRequest {
            mode: "describe",
            pr,
            description_markdown: None,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(pr_number = pr.pr_number, stage = "describe", error = %e, "transport failure");
                ReviewError::with_source("describe", review_core::error::ErrorKind::Transport, "pr-agent unreachable", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::protocol(
                "describe",
                format!("pr-agent returned status {status}"),
            ));
        }

        let parsed: DescribeResponse = response.json().await.map_err(|e| {
            ReviewError::with_source("describe", review_core::error::ErrorKind::Protocol, "unparseable pr-agent response", e)
        })?;

        Ok(parsed.description_markdown)
    }

    async fn review(&self, pr: &PrMetadata, description_markdown: &str) -> Result<String, ReviewError> {
        info!(pr_number = pr.pr_number, stage = "review", url = %self.url, "calling authoring service");

        let body = AuthoringRequest {
            mode: "review",
            pr,
            description_markdown: Some(description_markdown),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(pr_number = pr.pr_number, stage = "review", error = %e, "transport failure");
                ReviewError::with_source("review", review_core::error::ErrorKind::Transport, "pr-agent unreachable", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::protocol(
                "review",
                format!("pr-agent returned status {status}"),
            ));
        }

        let parsed: ReviewResponse = response.json().await.map_err(|e| {
            ReviewError::with_source("review", review_core::error::ErrorKind::Protocol, "unparseable pr-agent response", e)
        })?;

        Ok(parsed.review_markdown)
    }
}
