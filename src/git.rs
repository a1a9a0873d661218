//! Git operations used by the backport pipeline
//!
//! Thin wrappers over the `git` CLI. Git internals are never reimplemented
//! here; only exit statuses and text output are interpreted.

use crate::error::Result;
use crate::exec::{CommandRunner, ProcessOutput};
use std::sync::Arc;
use tracing::debug;

const GIT: &str = "git";

/// Outcome of `git cherry-pick`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CherryPickResult {
    /// The commit applied cleanly
    Applied,
    /// Cherry-pick failed (usually conflicts); the tree is left as git left it
    Conflict {
        /// Captured stdout and stderr of the failed cherry-pick
        details: String,
    },
}

/// Outcome of `git push`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    /// Branch was pushed
    Pushed,
    /// Remote rejected the push as non-fast-forward
    RejectedNonFastForward,
}

/// Git client backed by a [`CommandRunner`]
#[derive(Clone)]
pub struct GitClient {
    runner: Arc<dyn CommandRunner>,
}

impl GitClient {
    /// Create a client that runs git through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn raw(&self, args: &[&str]) -> Result<(Vec<String>, ProcessOutput)> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let output = self.runner.run(GIT, &args).await?;
        Ok((args, output))
    }

    async fn checked(&self, args: &[&str]) -> Result<String> {
        let (args, output) = self.raw(args).await?;
        output.into_checked(GIT, &args)
    }

    /// Whether `git status --porcelain` reports no changes
    pub async fn is_worktree_clean(&self) -> Result<bool> {
        let status = self.checked(&["status", "--porcelain"]).await?;
        Ok(status.is_empty())
    }

    /// Fetch a remote
    pub async fn fetch(&self, remote: &str) -> Result<()> {
        debug!(remote, "fetching");
        self.checked(&["fetch", remote]).await?;
        Ok(())
    }

    /// Create or reset `branch` to `remote/base` and check it out
    pub async fn checkout_branch_from(&self, remote: &str, base: &str, branch: &str) -> Result<()> {
        debug!(remote, base, branch, "checking out branch");
        let start = format!("{remote}/{base}");
        self.checked(&["checkout", "-B", branch, &start]).await?;
        Ok(())
    }

    /// Cherry-pick `sha` with `-x` so the commit records its provenance
    ///
    /// Any non-zero exit is reported as [`CherryPickResult::Conflict`]; the
    /// cherry-pick is not aborted, so the operator can resolve it in place.
    pub async fn cherry_pick(&self, sha: &str) -> Result<CherryPickResult> {
        debug!(sha, "cherry-picking");
        let (args, output) = self.raw(&["cherry-pick", "-x", sha]).await?;
        if output.success() {
            return Ok(CherryPickResult::Applied);
        }
        debug!(sha, status = output.status, "cherry-pick failed");
        Ok(CherryPickResult::Conflict {
            details: output.into_error(GIT, &args).to_string(),
        })
    }

    /// Push `branch` to `remote`, optionally with `--force-with-lease`
    ///
    /// A non-fast-forward rejection of a plain push is returned as a value so
    /// the caller can decide whether to retry with force. Every other
    /// failure is an error.
    pub async fn push(&self, remote: &str, branch: &str, force: bool) -> Result<PushResult> {
        debug!(remote, branch, force, "pushing");
        let mut args = vec!["push", "-u"];
        if force {
            args.push("--force-with-lease");
        }
        args.extend([remote, branch]);

        let (args, output) = self.raw(&args).await?;
        if output.success() {
            return Ok(PushResult::Pushed);
        }
        if !force && is_non_fast_forward(&output) {
            debug!(remote, branch, "push rejected as non-fast-forward");
            return Ok(PushResult::RejectedNonFastForward);
        }
        Err(output.into_error(GIT, &args))
    }

    /// Subject line of a commit
    pub async fn commit_subject(&self, sha: &str) -> Result<String> {
        let subject = self.checked(&["show", "-s", "--format=%s", sha]).await?;
        Ok(subject.trim_end().to_string())
    }

    /// URL configured for a remote
    pub async fn remote_url(&self, remote: &str) -> Result<String> {
        self.checked(&["remote", "get-url", remote]).await
    }
}

fn is_non_fast_forward(output: &ProcessOutput) -> bool {
    let text = output.combined();
    text.contains("non-fast-forward") || text.contains("non fast-forward")
}
