use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── PR metadata ──────────────────────────────────────────────────────────

/// Immutable PR metadata, built once from the webhook event.
///
/// `local_path` starts empty and is filled in by the Snapshotter; every
/// other field is fixed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrMetadata {
    pub repo_owner: String,
    pub repo_name: String,
    pub head_repo_owner: String,
    pub head_repo_name: String,
    pub pr_number: i64,
    pub head_sha: String,
    pub title: String,
    pub body: String,
    pub source_branch: String,
    pub target_branch: String,
    pub url: String,
    #[serde(default)]
    pub local_path: String,
}

impl PrMetadata {
    /// The deterministic scratch subdirectory name for this PR: a pure
    /// function of (repo_owner, repo_name, pr_number).
    pub fn snapshot_dirname(&self) -> String {
        format!("{}-{}-pr{}", self.repo_owner, self.repo_name, self.pr_number)
    }
}

// ── Webhook event ────────────────────────────────────────────────────────

/// The action a GitHub-shaped PR webhook carries. Only these three trigger
/// a pipeline run; anything else is ignored at the parser (Open Question 4:
/// other providers' equivalent events must be mapped explicitly here, never
/// silently).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    Opened,
    Reopened,
    Synchronize,
    Ignored,
}

impl WebhookAction {
    pub fn from_str(s: &str) -> Self {
        match s {
            "opened" => WebhookAction::Opened,
            "reopened" => WebhookAction::Reopened,
            "synchronize" => WebhookAction::Synchronize,
            _ => WebhookAction::Ignored,
        }
    }

    pub fn triggers_pipeline(&self) -> bool {
        !matches!(self, WebhookAction::Ignored)
    }
}

// ── Severity ─────────────────────────────────────────────────────────────

/// Ordered 5-tuple of finding counts by severity bucket, in descending
/// severity order: blocker, critical, major, minor, info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub blocker: u32,
    pub critical: u32,
    pub major: u32,
    pub minor: u32,
    pub info: u32,
}

impl SeverityCounts {
    pub fn total(&self) -> u32 {
        self.blocker + self.critical + self.major + self.minor + self.info
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// The canonical severity bucket a raw scanner label normalizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    /// Total mapping from a raw, case-insensitive severity label to a
    /// bucket. Unrecognized labels always map to `Info` — there is no
    /// error case.
    pub fn normalize(raw: &str) -> Severity {
        match raw.to_ascii_lowercase().as_str() {
            "blocker" => Severity::Blocker,
            "error" | "critical" => Severity::Critical,
            "warning" | "major" => Severity::Major,
            "note" | "minor" => Severity::Minor,
            _ => Severity::Info,
        }
    }
}

// ── Findings ─────────────────────────────────────────────────────────────

/// One issue reported by the remote scanning RPC. Ephemeral — never
/// persisted past the lifetime of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub path: String,
    pub start_line: u32,
    pub severity: String,
    pub message: String,
    pub excerpt: String,
}

// ── Code file map ────────────────────────────────────────────────────────

/// Mapping from repository-relative path to file content, built by the
/// Source Collector. Key order is irrelevant.
pub type CodeFileMap = HashMap<String, Vec<u8>>;

// ── Pipeline artifacts ───────────────────────────────────────────────────

/// The tuple of markdown/severity artifacts the pipeline produces, in
/// production order. Live only for the duration of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineArtifacts {
    pub description_markdown: String,
    pub review_markdown: String,
    pub security_markdown: String,
    pub severity_counts: SeverityCounts,
    pub final_markdown: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_dirname_is_pure_function_of_three_fields() {
        let pr = PrMetadata {
            repo_owner: "acme".into(),
            repo_name: "widget".into(),
            head_repo_owner: "fork-u".into(),
            head_repo_name: "widget".into(),
            pr_number: 42,
            head_sha: "abc".into(),
            title: "t".into(),
            body: "b".into(),
            source_branch: "feat-x".into(),
            target_branch: "main".into(),
            url: "https://example.com/pr/42".into(),
            local_path: String::new(),
        };
        assert_eq!(pr.snapshot_dirname(), "acme-widget-pr42");
    }

    #[test]
    fn action_parsing_is_explicit_not_catch_all_success() {
        assert!(WebhookAction::from_str("opened").triggers_pipeline());
        assert!(WebhookAction::from_str("reopened").triggers_pipeline());
        assert!(WebhookAction::from_str("synchronize").triggers_pipeline());
        assert!(!WebhookAction::from_str("closed").triggers_pipeline());
        assert!(!WebhookAction::from_str("labeled").triggers_pipeline());
    }

    #[test]
    fn severity_normalization_is_total() {
        assert_eq!(Severity::normalize("blocker"), Severity::Blocker);
        assert_eq!(Severity::normalize("BLOCKER"), Severity::Blocker);
        assert_eq!(Severity::normalize("error"), Severity::Critical);
        assert_eq!(Severity::normalize("critical"), Severity::Critical);
        assert_eq!(Severity::normalize("warning"), Severity::Major);
        assert_eq!(Severity::normalize("major"), Severity::Major);
        assert_eq!(Severity::normalize("note"), Severity::Minor);
        assert_eq!(Severity::normalize("minor"), Severity::Minor);
        assert_eq!(Severity::normalize("custom-whatever"), Severity::Info);
        assert_eq!(Severity::normalize(""), Severity::Info);
    }

    #[test]
    fn severity_counts_sum_invariant() {
        let counts = SeverityCounts {
            blocker: 1,
            critical: 1,
            major: 1,
            minor: 1,
            info: 1,
        };
        assert_eq!(counts.total(), 5);
    }
}
