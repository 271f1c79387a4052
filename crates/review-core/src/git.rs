use std::process::Command;

use crate::error::ReviewError;
use crate::types::PrMetadata;

const STAGE: &str = "snapshot";

pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

fn exec(args: &[&str]) -> Result<ExecResult, ReviewError> {
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|e| ReviewError::with_source(STAGE, crate::error::ErrorKind::Resource, "failed to spawn git", e))?;

    Ok(ExecResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(1),
    })
}

/// Builds the deterministic scratch destination `<scratch_root>/<owner>-<repo>-pr<n>`.
pub fn destination_path(scratch_root: &str, pr: &PrMetadata) -> String {
    std::path::Path::new(scratch_root)
        .join(pr.snapshot_dirname())
        .to_string_lossy()
        .into_owned()
}

/// Synthesizes the clone URL from head coordinates and the deployment's git host.
pub fn clone_url(git_host: &str, pr: &PrMetadata) -> String {
    format!("https://{}/{}/{}.git", git_host, pr.head_repo_owner, pr.head_repo_name)
}

/// Produces a local working directory containing the head-branch source and
/// writes the resulting path back into `pr.local_path`.
///
/// Any prior directory at the destination is removed best-effort before
/// cloning; removal failure is not itself fatal (the clone will simply fail
/// into a dirty directory and surface its own error).
pub fn snapshot(scratch_root: &str, git_host: &str, pr: &mut PrMetadata) -> Result<(), ReviewError> {
    let dest = destination_path(scratch_root, pr);
    let _ = std::fs::remove_dir_all(&dest);

    let url = clone_url(git_host, pr);
    let result = exec(&[
        "clone",
        "--depth",
        "1",
        "--branch",
        &pr.source_branch,
        &url,
        &dest,
    ])?;

    if !result.success() {
        return Err(ReviewError::resource(
            STAGE,
            format!(
                "git clone --depth 1 --branch {} {} failed: {}",
                pr.source_branch,
                url,
                result.combined_output()
            ),
        ));
    }

    pr.local_path = dest;
    Ok(())
}

/// The production `Snapshotter`: shells out to the real `git` binary via
/// `snapshot()` above. Holds the two pieces of deployment configuration
/// that function needs so `Pipeline` itself only depends on the trait.
pub struct GitSnapshotter {
    pub scratch_root: String,
    pub git_host: String,
}

#[async_trait::async_trait]
impl crate::clients::Snapshotter for GitSnapshotter {
    async fn snapshot(&self, pr: &mut PrMetadata) -> Result<(), ReviewError> {
        snapshot(&self.scratch_root, &self.git_host, pr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pr() -> PrMetadata {
        PrMetadata {
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
        }
    }

    #[test]
    fn destination_path_is_pure_function_of_owner_repo_number() {
        let pr = sample_pr();
        let a = destination_path("/tmp/scratch", &pr);
        let b = destination_path("/tmp/scratch", &pr);
        assert_eq!(a, b);
        assert!(a.ends_with("acme-widget-pr42"));
    }

    #[test]
    fn clone_url_uses_head_coordinates_not_destination_coordinates() {
        let pr = sample_pr();
        assert_eq!(clone_url("github.com", &pr), "https://github.com/fork-u/widget.git");
    }

    #[test]
    fn snapshot_removes_stale_destination_before_failing_clone() {
        let mut pr = sample_pr();
        let dir = tempfile::tempdir().unwrap();
        let dest = destination_path(dir.path().to_str().unwrap(), &pr);
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(std::path::Path::new(&dest).join("stale.txt"), b"old").unwrap();

        pr.head_repo_owner = "this-owner-and-repo-do-not-exist-anywhere".into();
        pr.head_repo_name = "this-owner-and-repo-do-not-exist-anywhere".into();
        let result = snapshot(dir.path().to_str().unwrap(), "127.0.0.1:1", &mut pr);

        // A bogus host makes the clone fail fast; either way the stale file
        // must not survive the best-effort removal step.
        assert!(result.is_err());
        assert!(!std::path::Path::new(&dest).join("stale.txt").exists());
    }
}
