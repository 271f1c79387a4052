use std::fmt;

/// One of the five error kinds a pipeline stage can fail with.
///
/// The orchestrator maps each kind onto an HTTP status for the webhook
/// caller; the scan stage is the only consumer that never lets one of
/// these escape (it swallows failures into a heuristic success instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed webhook, unknown action, missing destination.
    Validation,
    /// Failure reaching a downstream service (connect/timeout/transport).
    Transport,
    /// Downstream responded with non-2xx or an unparseable body.
    Protocol,
    /// Cannot clone the repository, cannot read a file.
    Resource,
    /// Encoding/serialization failure internal to this process.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Resource => "resource",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A stage-tagged pipeline error.
///
/// `stage` names the pipeline stage that produced the error (e.g.
/// "snapshot", "describe", "review", "collect", "scan", "synthesize",
/// "post") so the orchestrator can log `{stage, pr, repo, error}` without
/// string-matching the error message.
#[derive(Debug, thiserror::Error)]
#[error("{stage}: {kind}: {message}")]
pub struct ReviewError {
    pub stage: &'static str,
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl ReviewError {
    pub fn new(stage: &'static str, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        stage: &'static str,
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn validation(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, ErrorKind::Validation, message)
    }

    pub fn transport(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, ErrorKind::Transport, message)
    }

    pub fn protocol(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, ErrorKind::Protocol, message)
    }

    pub fn resource(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, ErrorKind::Resource, message)
    }

    pub fn internal(stage: &'static str, message: impl Into<String>) -> Self {
        Self::new(stage, ErrorKind::Internal, message)
    }

    /// HTTP status the webhook entrypoint responds with for a fatal stage
    /// failure of this kind. Non-fatal stages (scan) never call this.
    pub fn http_status(&self) -> u16 {
        match self.kind {
            ErrorKind::Validation => 400,
            ErrorKind::Transport | ErrorKind::Protocol | ErrorKind::Resource | ErrorKind::Internal => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReviewError>;
