use review_core::types::{Finding, Severity, SeverityCounts};

use crate::severity;

const MINOR_LIMIT: usize = 5;
const INFO_LIMIT: usize = 3;

/// Renders the full "Semgrep Summary" body for a non-empty, non-degenerate
/// result: counts table followed by one section per non-empty bucket, in
/// descending severity order (spec §4.4 "Markdown shape").
pub fn render(findings: &[Finding], counts: SeverityCounts) -> String {
    let mut out = String::from("## Semgrep Summary\n\n");
    out.push_str(&counts_table(counts));

    for (bucket_kind, label, limit) in [
        (Severity::Blocker, "Blocker", None),
        (Severity::Critical, "Critical", None),
        (Severity::Major, "Major", None),
        (Severity::Minor, "Minor", Some(MINOR_LIMIT)),
        (Severity::Info, "Info", Some(INFO_LIMIT)),
    ] {
        let bucketed = severity::bucket(findings, bucket_kind);
        if bucketed.is_empty() {
            continue;
        }
        out.push_str(&format!("\n### {label}\n\n"));
        let shown = limit.unwrap_or(bucketed.len());
        for f in bucketed.iter().take(shown) {
            out.push_str(&format!(
                "- **{}** — `{}:{}` ({}): {}\n",
                f.message, f.path, f.start_line, f.rule_id, f.excerpt
            ));
        }
        if bucketed.len() > shown {
            out.push_str(&format!("- …and {} more\n", bucketed.len() - shown));
        }
    }

    out
}

fn counts_table(counts: SeverityCounts) -> String {
    format!(
        "| Blocker | Critical | Major | Minor | Info |\n|---|---|---|---|---|\n| {} | {} | {} | {} | {} |\n",
        bold_if_nonzero(counts.blocker),
        bold_if_nonzero(counts.critical),
        bold_if_nonzero(counts.major),
        counts.minor,
        counts.info,
    )
}

fn bold_if_nonzero(n: u32) -> String {
    if n > 0 {
        format!("**{n}**")
    } else {
        n.to_string()
    }
}

/// Step 1 of the algorithm: the file map itself was empty.
pub fn no_code_files() -> String {
    "## Semgrep Summary\n\nno code files found\n".to_string()
}

/// Step 4: every configuration returned zero findings with no transport error.
pub fn no_issues_found() -> String {
    "## Semgrep Summary\n\nno issues found\n".to_string()
}

/// Step 3: every configuration returned zero findings and at least one
/// transport error occurred along the way.
pub fn scanning_failed() -> String {
    "## Semgrep Summary\n\nscanning failed, here are best-practice reminders:\n\n\
    - Validate all external input before use.\n\
    - Avoid embedding secrets in source.\n\
    - Keep dependencies current.\n"
        .to_string()
}
