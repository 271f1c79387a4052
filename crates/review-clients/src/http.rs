use std::time::Duration;

/// Builds the shared HTTP client every downstream call uses.
///
/// The client's own total timeout is deliberately generous (spec §4.1: "the
/// HTTP client has a generous total timeout (≥15 minutes) so that the
/// pipeline context is the authoritative deadline") — the pipeline-owned
/// deadline wrapping the whole run is what actually bounds a stuck call,
/// not this client.
pub fn build_client(total_timeout_minutes: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(total_timeout_minutes.max(15) * 60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}
