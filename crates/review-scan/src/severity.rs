use review_core::types::{Finding, Severity, SeverityCounts};

/// Counts findings into buckets. The sum always equals `findings.len()`
/// since `Severity::normalize` is total (spec §8 invariant 3 and 4).
pub fn counts(findings: &[Finding]) -> SeverityCounts {
    let mut counts = SeverityCounts::zero();
    for f in findings {
        match Severity::normalize(&f.severity) {
            Severity::Blocker => counts.blocker += 1,
            Severity::Critical => counts.critical += 1,
            Severity::Major => counts.major += 1,
            Severity::Minor => counts.minor += 1,
            Severity::Info => counts.info += 1,
        }
    }
    counts
}

/// All findings in `bucket`, preserving their original order of arrival.
pub fn bucket(findings: &[Finding], wanted: Severity) -> Vec<&Finding> {
    findings.iter().filter(|f| Severity::normalize(&f.severity) == wanted).collect()
}
