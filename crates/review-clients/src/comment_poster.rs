use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use review_core::clients::CommentPoster;
use review_core::error::ReviewError;
use review_core::types::PrMetadata;

/// Posts the final markdown through the Source-Control Adapter (spec §4.7).
pub struct McpCommentPoster {
    http: reqwest::Client,
    url: String,
}

impl McpCommentPoster {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[derive(Serialize)]
struct PostRequest<'a> {
    action: &'a str,
    pr: &'a PrMetadata,
    body: &'a str,
    body_format: &'a str,
}

#[async_trait]
impl CommentPoster for McpCommentPoster {
    async fn post(&self, pr: &PrMetadata, body: &str) -> Result<(), ReviewError> {
        info!(pr_number = pr.pr_number, stage = "post", url = %self.url, "posting comment");

        let request = PostRequest {
            action: "comment",
            pr,
            body,
            body_format: "markdown",
        };

        let response = self.http.post(&self.url).json(&request).send().await.map_err(|e| {
            warn!(pr_number = pr.pr_number, stage = "post", error = %e, "transport failure, all upstream work lost");
            ReviewError::with_source("post", review_core::error::ErrorKind::Transport, "source-control adapter unreachable", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReviewError::protocol(
                "post",
                format!("source-control adapter returned status {status}"),
            ));
        }

        Ok(())
    }
}
