use serde::Deserialize;

use crate::error::ReviewError;
use crate::types::{PrMetadata, WebhookAction};

const STAGE: &str = "webhook";

/// Raw GitHub-shaped webhook payload, decoded before any validation.
#[derive(Debug, Deserialize)]
pub struct RawWebhookEvent {
    pub action: String,
    pub number: i64,
    pub pull_request: RawPullRequest,
    pub repository: RawRepository,
}

#[derive(Debug, Deserialize)]
pub struct RawPullRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub html_url: String,
    pub head: RawRef,
    pub base: RawBaseRef,
}

#[derive(Debug, Deserialize)]
pub struct RawRef {
    pub r#ref: String,
    pub sha: String,
    pub repo: RawRepository,
}

#[derive(Debug, Deserialize)]
pub struct RawBaseRef {
    pub r#ref: String,
}

#[derive(Debug, Deserialize)]
pub struct RawRepository {
    pub name: String,
    pub owner: RawOwner,
}

#[derive(Debug, Deserialize)]
pub struct RawOwner {
    pub login: String,
}

/// Decodes a raw webhook body. Decode failure is always a `ValidationError`.
pub fn decode(body: &[u8]) -> Result<RawWebhookEvent, ReviewError> {
    serde_json::from_slice(body)
        .map_err(|e| ReviewError::with_source(STAGE, crate::error::ErrorKind::Validation, "invalid webhook payload", e))
}

/// The outcome of inspecting a decoded webhook: either ignore it, or build
/// PR Metadata and run the pipeline.
pub enum Disposition {
    Ignored,
    Triggered(PrMetadata),
}

/// Applies the action filter and, if triggering, builds PR Metadata.
pub fn dispatch(event: RawWebhookEvent) -> Disposition {
    let action = WebhookAction::from_str(&event.action);
    if !action.triggers_pipeline() {
        return Disposition::Ignored;
    }

    let pr = PrMetadata {
        repo_owner: event.repository.owner.login,
        repo_name: event.repository.name,
        head_repo_owner: event.pull_request.head.repo.owner.login,
        head_repo_name: event.pull_request.head.repo.name,
        pr_number: event.number,
        head_sha: event.pull_request.head.sha,
        title: event.pull_request.title,
        body: event.pull_request.body,
        source_branch: event.pull_request.head.r#ref,
        target_branch: event.pull_request.base.r#ref,
        url: event.pull_request.html_url,
        local_path: String::new(),
    };

    Disposition::Triggered(pr)
}
