use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::github::SourceControlApi;

pub struct AppState {
    pub api: Arc<dyn SourceControlApi>,
    pub default_owner: String,
    pub default_repo: String,
}

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// The two request shapes spec §4.7 requires the adapter to accept. `pr` is
/// either a full-metadata object naming the destination repository, or a
/// bare PR number that falls back to the adapter's configured defaults.
#[derive(Deserialize)]
pub struct PostCommentRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub action: Option<String>,
    pub pr: PrField,
    pub body: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub body_format: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum PrField {
    Full(FullPrTarget),
    Minimal(i64),
}

#[derive(Deserialize)]
pub struct FullPrTarget {
    pub repo_owner: String,
    pub repo_name: String,
    pub pr_number: i64,
}

/// Destination repository coordinates plus the PR number to comment on,
/// resolved from either request shape (spec §4.7 "resolving_target" state).
struct Target {
    owner: String,
    repo: String,
    pr_number: i64,
}

/// Request-level state machine: `parsing → resolving_target → posting →
/// done|failed`. No durable state survives one request (spec §4.7).
pub async fn post_comment(State(state): State<Arc<AppState>>, Json(request): Json<PostCommentRequest>) -> (StatusCode, Json<Value>) {
    // `parsing` already succeeded by the time axum's extractor hands us a
    // `PostCommentRequest` — a malformed body never reaches this function
    // body at all (axum responds 400 itself on extractor failure).
    tracing::info!(state = "parsing", "comment request parsed");

    let target = match resolve_target(&request.pr, &state.default_owner, &state.default_repo) {
        Some(t) => {
            tracing::info!(state = "resolving_target", owner = %t.owner, repo = %t.repo, pr_number = t.pr_number, "destination resolved");
            t
        }
        None => {
            tracing::warn!(state = "failed", "cannot resolve destination repository, no defaults configured");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "cannot resolve destination repository" })),
            );
        }
    };

    tracing::info!(state = "posting", owner = %target.owner, repo = %target.repo, pr_number = target.pr_number, "posting comment");

    match state.api.post_comment(&target.owner, &target.repo, target.pr_number, &request.body).await {
        Ok(()) => {
            tracing::info!(state = "done", pr_number = target.pr_number, "comment posted");
            (StatusCode::OK, Json(json!({ "status": "posted" })))
        }
        Err(e) => {
            tracing::error!(state = "failed", pr_number = target.pr_number, error = %e, "downstream source-control API failed");
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() })))
        }
    }
}

fn resolve_target(pr: &PrField, default_owner: &str, default_repo: &str) -> Option<Target> {
    match pr {
        PrField::Full(full) => Some(Target {
            owner: full.repo_owner.clone(),
            repo: full.repo_name.clone(),
            pr_number: full.pr_number,
        }),
        PrField::Minimal(pr_number) => {
            if default_owner.is_empty() || default_repo.is_empty() {
                return None;
            }
            Some(Target {
                owner: default_owner.to_string(),
                repo: default_repo.to_string(),
                pr_number: *pr_number,
            })
        }
    }
}
