use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::clients::{AuthoringClient, CommentPoster, ScanClient, Snapshotter, SynthesisClient};
use crate::collect;
use crate::error::ReviewError;
use crate::types::{PipelineArtifacts, PrMetadata};

/// The downstream collaborators a pipeline run needs, bundled once at
/// startup and shared across every webhook (spec §5: "the HTTP client is
/// shared and safe for concurrent use" generalizes to all clients here).
pub struct Pipeline {
    pub snapshotter: Arc<dyn Snapshotter>,
    pub authoring: Arc<dyn AuthoringClient>,
    pub scan: Arc<dyn ScanClient>,
    pub synthesis: Arc<dyn SynthesisClient>,
    pub comment_poster: Arc<dyn CommentPoster>,
}

impl Pipeline {
    /// Runs every stage in strict sequence for one PR, mutating `pr.local_path`
    /// in place at the snapshot stage. Returns the full artifact tuple on
    /// success, or the first fatal stage's error.
    ///
    /// The scan stage never returns an `Err` out of this function — its
    /// own client failures are absorbed before this method observes them,
    /// per spec: scan is the one stage with recovery.
    pub async fn run(&self, pr: &mut PrMetadata) -> Result<PipelineArtifacts, ReviewError> {
        info!(pr_number = pr.pr_number, repo = %pr.repo_name, stage = "snapshot", "starting pipeline");

        self.snapshotter.snapshot(pr).await?;
        info!(pr_number = pr.pr_number, stage = "snapshot", "completed");

        let description_markdown = self.authoring.describe(pr).await.map_err(|e| {
            error!(pr_number = pr.pr_number, stage = "describe", error = %e, "fatal stage failure");
            e
        })?;
        info!(pr_number = pr.pr_number, stage = "describe", "completed");

        let review_markdown = self
            .authoring
            .review(pr, &description_markdown)
            .await
            .map_err(|e| {
                error!(pr_number = pr.pr_number, stage = "review", error = %e, "fatal stage failure");
                e
            })?;
        info!(pr_number = pr.pr_number, stage = "review", "completed");

        // collect is synchronous and infallible by design (spec §4.3): an
        // empty map is a valid input to scan, never an error.
        let files = collect::collect(&pr.local_path);
        info!(
            pr_number = pr.pr_number,
            stage = "collect",
            file_count = files.len(),
            "completed"
        );

        let scan_outcome = match self.scan.scan(pr, &files).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Scan failure is recoverable: log it but do not propagate.
                // The scan client itself is expected to absorb transport
                // failures into a heuristic outcome; this branch only
                // triggers if the client implementation itself panics the
                // contract (e.g. a bug), so we still degrade gracefully
                // rather than aborting the whole pipeline.
                error!(pr_number = pr.pr_number, stage = "scan", error = %e, "scan stage failed, degrading to heuristic result");
                crate::clients::ScanOutcome {
                    markdown: heuristic_scan_markdown(),
                    severity: crate::types::SeverityCounts::zero(),
                }
            }
        };
        info!(
            pr_number = pr.pr_number,
            stage = "scan",
            total_findings = scan_outcome.severity.total(),
            "completed"
        );

        let final_markdown = self
            .synthesis
            .synthesize(
                pr,
                &description_markdown,
                &review_markdown,
                &scan_outcome.markdown,
                scan_outcome.severity,
            )
            .await
            .map_err(|e| {
                error!(pr_number = pr.pr_number, stage = "synthesize", error = %e, "fatal stage failure");
                e
            })?;
        info!(pr_number = pr.pr_number, stage = "synthesize", "completed");

        self.comment_poster.post(pr, &final_markdown).await.map_err(|e| {
            error!(pr_number = pr.pr_number, stage = "post", error = %e, "fatal stage failure, all upstream work lost");
            e
        })?;
        info!(pr_number = pr.pr_number, stage = "post", "pipeline completed successfully");

        Ok(PipelineArtifacts {
            description_markdown,
            review_markdown,
            security_markdown: scan_outcome.markdown,
            severity_counts: scan_outcome.severity,
            final_markdown,
        })
    }
}

/// The deterministic heuristic body used when the scan stage's own client
/// contract is somehow violated. This mirrors — but is distinct from — the
/// scan service's internal "scanning failed" body (spec §4.4 step 3); this
/// one only fires if a `ScanClient` implementation itself returns `Err`,
/// which a conforming implementation never does.
fn heuristic_scan_markdown() -> String {
    "## Semgrep Summary\n\nScanning failed, here are best-practice reminders:\n\n\
    - Validate all external input before use.\n\
    - Avoid embedding secrets in source.\n\
    - Keep dependencies current.\n"
        .to_string()
}

/// Runs the pipeline under a single pipeline-owned deadline, independent of
/// any inbound request's cancellation. The caller MUST NOT select this
/// future against the webhook request's own cancellation — spawn it and
/// await the join handle instead (see `review-server::routes`).
pub async fn run_with_deadline(
    pipeline: Arc<Pipeline>,
    mut pr: PrMetadata,
    timeout: Duration,
) -> Result<PipelineArtifacts, ReviewError> {
    match tokio::time::timeout(timeout, async move { pipeline.run(&mut pr).await }).await {
        Ok(result) => result,
        Err(_) => Err(ReviewError::internal(
            "pipeline",
            format!("pipeline exceeded its {:?} deadline", timeout),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ScanOutcome;
    use crate::error::ErrorKind;
    use crate::types::{CodeFileMap, SeverityCounts};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Never shells out to `git`: just stamps `local_path` so `run()` can
    /// proceed into `collect`/`scan` against an empty (nonexistent)
    /// directory. This is what makes `Pipeline::run` itself testable
    /// end-to-end rather than only its individual stages.
    struct FakeSnapshotter {
        fails: bool,
    }

    #[async_trait]
    impl Snapshotter for FakeSnapshotter {
        async fn snapshot(&self, pr: &mut PrMetadata) -> Result<(), ReviewError> {
            if self.fails {
                return Err(ReviewError::resource("snapshot", "clone failed"));
            }
            pr.local_path = "/nonexistent-test-snapshot-dir".to_string();
            Ok(())
        }
    }

    struct FakeAuthoring {
        describe_fails: bool,
    }

    #[async_trait]
    impl AuthoringClient for FakeAuthoring {
        async fn describe(&self, _pr: &PrMetadata) -> Result<String, ReviewError> {
            if self.describe_fails {
                Err(ReviewError::transport("describe", "pr-agent unreachable"))
            } else {
                Ok("a description".to_string())
            }
        }

        async fn review(&self, _pr: &PrMetadata, description_markdown: &str) -> Result<String, ReviewError> {
            Ok(format!("review of: {description_markdown}"))
        }
    }

    struct FakeScan {
        calls: AtomicUsize,
        fails: bool,
    }

    #[async_trait]
    impl ScanClient for FakeScan {
        async fn scan(&self, _pr: &PrMetadata, _files: &CodeFileMap) -> Result<ScanOutcome, ReviewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                return Err(ReviewError::transport("scan", "scan service unreachable"));
            }
            Ok(ScanOutcome {
                markdown: "## Semgrep Summary\n\nno issues found\n".to_string(),
                severity: SeverityCounts::zero(),
            })
        }
    }

    struct FakeSynthesis;

    #[async_trait]
    impl SynthesisClient for FakeSynthesis {
        async fn synthesize(
            &self,
            _pr: &PrMetadata,
            description_markdown: &str,
            review_markdown: &str,
            security_markdown: &str,
            _severity: SeverityCounts,
        ) -> Result<String, ReviewError> {
            Ok(format!("{description_markdown}\n{review_markdown}\n{security_markdown}"))
        }
    }

    struct FakePoster {
        posts: AtomicUsize,
    }

    #[async_trait]
    impl CommentPoster for FakePoster {
        async fn post(&self, _pr: &PrMetadata, _body: &str) -> Result<(), ReviewError> {
            self.posts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sample_pr() -> PrMetadata {
        PrMetadata {
            repo_owner: "acme".into(),
            repo_name: "widget".into(),
            head_repo_owner: "acme".into(),
            head_repo_name: "widget".into(),
            pr_number: 1,
            head_sha: "abc".into(),
            title: "t".into(),
            body: "b".into(),
            source_branch: "main".into(),
            target_branch: "main".into(),
            url: "https://example.com/pr/1".into(),
            local_path: String::new(),
        }
    }

    fn sample_pipeline(describe_fails: bool, scan_fails: bool) -> (Arc<Pipeline>, Arc<FakePoster>) {
        let poster = Arc::new(FakePoster { posts: AtomicUsize::new(0) });
        let pipeline = Arc::new(Pipeline {
            snapshotter: Arc::new(FakeSnapshotter { fails: false }),
            authoring: Arc::new(FakeAuthoring { describe_fails }),
            scan: Arc::new(FakeScan { calls: AtomicUsize::new(0), fails: scan_fails }),
            synthesis: Arc::new(FakeSynthesis),
            comment_poster: poster.clone(),
        });
        (pipeline, poster)
    }

    #[tokio::test]
    async fn run_snapshot_failure_is_fatal_and_posts_nothing() {
        let poster = Arc::new(FakePoster { posts: AtomicUsize::new(0) });
        let pipeline = Pipeline {
            snapshotter: Arc::new(FakeSnapshotter { fails: true }),
            authoring: Arc::new(FakeAuthoring { describe_fails: false }),
            scan: Arc::new(FakeScan { calls: AtomicUsize::new(0), fails: false }),
            synthesis: Arc::new(FakeSynthesis),
            comment_poster: poster.clone(),
        };

        let mut pr = sample_pr();
        let result = pipeline.run(&mut pr).await;

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().stage, "snapshot");
        assert_eq!(poster.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_describe_failure_is_fatal_and_skips_downstream_stages() {
        let (pipeline, poster) = sample_pipeline(true, false);

        let mut pr = sample_pr();
        let result = pipeline.run(&mut pr).await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.stage, "describe");
        assert_eq!(err.http_status(), 500);
        assert_eq!(poster.posts.load(Ordering::SeqCst), 0, "no comment may be posted on a fatal stage failure");
    }

    #[tokio::test]
    async fn run_scan_failure_degrades_but_pipeline_still_completes_and_posts() {
        let (pipeline, poster) = sample_pipeline(false, true);

        let mut pr = sample_pr();
        let artifacts = pipeline.run(&mut pr).await.expect("scan failure must not be fatal");

        assert_eq!(artifacts.severity_counts.total(), 0);
        assert!(artifacts.security_markdown.contains("best-practice"));
        assert_eq!(poster.posts.load(Ordering::SeqCst), 1, "exactly one comment must be posted");
    }

    #[tokio::test]
    async fn run_happy_path_produces_all_artifacts_in_order_and_posts_once() {
        let (pipeline, poster) = sample_pipeline(false, false);

        let mut pr = sample_pr();
        let artifacts = pipeline.run(&mut pr).await.expect("every stage should succeed");

        assert_eq!(artifacts.description_markdown, "a description");
        assert_eq!(artifacts.review_markdown, "review of: a description");
        assert!(artifacts.security_markdown.contains("no issues found"));
        assert_eq!(artifacts.severity_counts.total(), 0);
        assert!(artifacts.final_markdown.contains("a description"));
        assert!(artifacts.final_markdown.contains("review of: a description"));
        assert_eq!(poster.posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_with_deadline_surfaces_the_real_runs_result() {
        let (pipeline, poster) = sample_pipeline(false, false);
        let pr = sample_pr();

        let result = run_with_deadline(pipeline, pr, Duration::from_secs(30)).await;

        assert!(result.is_ok());
        assert_eq!(poster.posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scan_configuration_is_consulted_exactly_once_on_success() {
        let scan = Arc::new(FakeScan { calls: AtomicUsize::new(0), fails: false });
        let pr = sample_pr();
        scan.scan(&pr, &CodeFileMap::new()).await.unwrap();
        assert_eq!(scan.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_kind_of_transport_scan_failure_is_transport() {
        let e = ReviewError::transport("scan", "unreachable");
        assert_eq!(e.kind, ErrorKind::Transport);
    }
}
