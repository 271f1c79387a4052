use async_trait::async_trait;

use crate::error::ReviewError;
use crate::types::{CodeFileMap, PrMetadata, SeverityCounts};

/// Produces a local working directory containing the PR's head-branch
/// source and writes the resulting path back into `pr.local_path` (spec
/// §4.2). Abstracted as a trait, like every other downstream collaborator
/// here, so `Pipeline::run` can be driven end-to-end in tests against a
/// fake that never shells out to `git`.
#[async_trait]
pub trait Snapshotter: Send + Sync {
    async fn snapshot(&self, pr: &mut PrMetadata) -> Result<(), ReviewError>;
}

/// The authoring service's two call modes (spec §4.5): description and
/// review share one downstream contract but are invoked through distinct
/// methods here so each stage's failure can be tagged with its own stage
/// name in logs and errors.
#[async_trait]
pub trait AuthoringClient: Send + Sync {
    async fn describe(&self, pr: &PrMetadata) -> Result<String, ReviewError>;

    async fn review(&self, pr: &PrMetadata, description_markdown: &str) -> Result<String, ReviewError>;
}

/// The outcome of a scan stage invocation, from the orchestrator's point of
/// view. Unlike the other clients, this is never a `Result` at the call
/// site the pipeline uses — the scan stage absorbs its own failures (spec
/// §4.1, §4.4, §9) and always returns a usable markdown/severity pair.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub markdown: String,
    pub severity: SeverityCounts,
}

#[async_trait]
pub trait ScanClient: Send + Sync {
    /// Runs the full scan algorithm (spec §4.4) against the collected file
    /// map. This call itself can still fail at the transport level (e.g.
    /// the scan service's HTTP endpoint is unreachable); the pipeline
    /// treats any `Err` the same way it treats the scan service's own
    /// error-shaped response — recoverably.
    async fn scan(&self, pr: &PrMetadata, files: &CodeFileMap) -> Result<ScanOutcome, ReviewError>;
}

#[async_trait]
pub trait SynthesisClient: Send + Sync {
    async fn synthesize(
        &self,
        pr: &PrMetadata,
        description_markdown: &str,
        review_markdown: &str,
        security_markdown: &str,
        severity: SeverityCounts,
    ) -> Result<String, ReviewError>;
}

#[async_trait]
pub trait CommentPoster: Send + Sync {
    async fn post(&self, pr: &PrMetadata, body: &str) -> Result<(), ReviewError>;
}
