use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use review_core::pipeline::{run_with_deadline, Pipeline};
use review_core::webhook::{self, Disposition};

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub pipeline_timeout: Duration,
}

/// Logs a warning if dropped before `mark_completed` is called. Attached to
/// the webhook handler's own future, not to the spawned pipeline task, so a
/// client disconnect that causes hyper to drop the handler future is
/// observed here while the pipeline — already detached via `tokio::spawn` —
/// keeps running untouched (spec §4.1 "context discipline").
struct DisconnectGuard {
    pr_number: i64,
    completed: bool,
}

impl DisconnectGuard {
    fn new(pr_number: i64) -> Self {
        Self { pr_number, completed: false }
    }

    fn mark_completed(&mut self) {
        self.completed = true;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!(
                pr_number = self.pr_number,
                "webhook request disconnected before the pipeline resolved; pipeline continues in the background"
            );
        }
    }
}

pub async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub async fn webhook(State(state): State<Arc<AppState>>, body: Bytes) -> (StatusCode, String) {
    let event = match webhook::decode(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(stage = "webhook", error = %e, "rejecting malformed webhook payload");
            let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
            return (status, e.to_string());
        }
    };

    let pr = match webhook::dispatch(event) {
        Disposition::Ignored => return (StatusCode::OK, "ignored".to_string()),
        Disposition::Triggered(pr) => pr,
    };

    let pr_number = pr.pr_number;
    tracing::info!(pr_number, stage = "webhook", "pipeline triggered");

    let mut guard = DisconnectGuard::new(pr_number);

    // Spawned onto its own task so the pipeline's lifetime is independent
    // of this handler's future — the inbound request disconnecting cannot
    // cancel work already under way.
    let pipeline = Arc::clone(&state.pipeline);
    let timeout = state.pipeline_timeout;
    let handle = tokio::spawn(async move { run_with_deadline(pipeline, pr, timeout).await });

    let outcome = handle.await;
    guard.mark_completed();

    match outcome {
        Ok(Ok(_artifacts)) => {
            tracing::info!(pr_number, "pipeline succeeded, comment posted");
            (StatusCode::OK, "processed".to_string())
        }
        Ok(Err(e)) => {
            tracing::error!(pr_number, stage = e.stage, error = %e, "pipeline failed");
            let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "pipeline failed".to_string())
        }
        Err(join_err) => {
            tracing::error!(pr_number, error = %join_err, "pipeline task panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "pipeline failed".to_string())
        }
    }
}
