use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use review_core::clients::SynthesisClient;
use review_core::error::ReviewError;
use review_core::types::{PrMetadata, SeverityCounts};

pub struct SynthesisServiceClient {
    http: reqwest::Client,
    url: String,
}

impl SynthesisServiceClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    pr: &'a PrMetadata,
    description_markdown: &'a str,
    review_markdown: &'a str,
    semgrep_markdown: &'a str,
    semgrep_severity: SeverityCounts,
}

#[derive(Deserialize)]
struct SynthesisResponse {
    markdown: String,
}

#[async_trait]
impl SynthesisClient for SynthesisServiceClient {
    async fn synthesize(
        &self,
        pr: &PrMetadata,
        description_markdown: &str,
        review_markdown: &str,
        security_markdown: &str,
        severity: SeverityCounts,
    ) -> Result<String, ReviewError> {
        info!(pr_number = pr.pr_number, stage = "synthesize", url = %self.url, "calling synthesis service");

        let body = SynthesisRequest {
            pr,
            description_markdown,
            review_markdown,
            semgrep_markdown: security_markdown,
            semgrep_severity: severity,
        };

        let response = self.http.post(&self.url).json(&body).send().await.map_err(|e| {
            warn!(pr_number = pr.pr_number, stage = "synthesize", error = %e, "transport failure");
            ReviewError::with_source("synthesize", review_core::error::ErrorKind::Transport, "synthesis service unreachable", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::protocol(
                "synthesize",
                format!("synthesis service returned status {status}"),
            ));
        }

        let parsed: SynthesisResponse = response.json().await.map_err(|e| {
            ReviewError::with_source("synthesize", review_core::error::ErrorKind::Protocol, "unparseable synthesis response", e)
        })?;

        Ok(parsed.markdown)
    }
}
