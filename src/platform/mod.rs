//! Code-hosting platform services
//!
//! Provides a single interface for the PR queries and mutations the
//! backport engine needs, plus remote URL detection.

mod detection;
mod github;

pub use detection::parse_repo_slug;
pub use github::{GhCliService, PR_LIST_FIELDS, PR_VIEW_FIELDS};

use crate::error::Result;
use crate::types::{NewPullRequest, PullRequestRecord, RepoSlug};
use async_trait::async_trait;

/// Platform service trait for PR operations
///
/// Searching is delegated entirely to the platform; callers only interpret
/// the structured records that come back.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch one PR including its merge commit
    async fn view_pr(&self, pr_number: u64) -> Result<PullRequestRecord>;

    /// List PRs in any state targeting `base` and carrying `label`
    async fn list_labeled_prs(&self, base: &str, label: &str) -> Result<Vec<PullRequestRecord>>;

    /// List PRs in any state matching a platform search query
    async fn search_prs(&self, query: &str) -> Result<Vec<PullRequestRecord>>;

    /// Create a PR and return its URL
    async fn create_pr(&self, pr: &NewPullRequest) -> Result<String>;

    /// Repository this service is pinned to (`None` = the CLI's own context)
    fn repo(&self) -> Option<&RepoSlug>;
}
