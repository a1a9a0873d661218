//! GitHub platform service backed by the `gh` CLI

use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, PullRequestRecord, RepoSlug};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const GH: &str = "gh";

/// JSON fields requested from `gh pr view`
pub const PR_VIEW_FIELDS: &str = "number,title,body,url,state,mergedAt,mergeCommit";

/// JSON fields requested from `gh pr list`
pub const PR_LIST_FIELDS: &str = "number,title,body,url,state,mergedAt";

const SEARCH_LIMIT: &str = "500";
const LABEL_LIMIT: &str = "1000";

/// GitHub service driving the authenticated `gh` CLI
pub struct GhCliService {
    runner: Arc<dyn CommandRunner>,
    repo: Option<RepoSlug>,
}

impl GhCliService {
    /// Create a service; `repo` of `None` lets `gh` infer the repository
    pub fn new(runner: Arc<dyn CommandRunner>, repo: Option<RepoSlug>) -> Self {
        Self { runner, repo }
    }

    fn with_repo_arg(&self, mut args: Vec<String>) -> Vec<String> {
        if let Some(ref repo) = self.repo {
            args.push("-R".to_string());
            args.push(repo.cli_arg());
        }
        args
    }

    async fn gh(&self, args: Vec<String>) -> Result<String> {
        let args = self.with_repo_arg(args);
        self.runner.run(GH, &args).await?.into_checked(GH, &args)
    }

    async fn list(&self, args: Vec<String>, context: &str) -> Result<Vec<PullRequestRecord>> {
        let out = self.gh(args).await?;
        parse_pr_list(&out, context)
    }
}

fn to_args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

/// Parse `gh pr list --json` output; empty output means no results
fn parse_pr_list(out: &str, context: &str) -> Result<Vec<PullRequestRecord>> {
    if out.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(out).map_err(|source| Error::Json {
        context: context.to_string(),
        source,
    })
}

#[async_trait]
impl PlatformService for GhCliService {
    async fn view_pr(&self, pr_number: u64) -> Result<PullRequestRecord> {
        debug!(pr_number, "viewing PR");
        let number = pr_number.to_string();
        let out = self
            .gh(to_args(&["pr", "view", &number, "--json", PR_VIEW_FIELDS]))
            .await?;
        serde_json::from_str(&out).map_err(|source| Error::Json {
            context: format!("gh pr view {pr_number}"),
            source,
        })
    }

    async fn list_labeled_prs(&self, base: &str, label: &str) -> Result<Vec<PullRequestRecord>> {
        debug!(base, label, "listing labeled PRs");
        let args = to_args(&[
            "pr", "list", "--state", "all", "--base", base, "--label", label, "--limit",
            LABEL_LIMIT, "--json", PR_LIST_FIELDS,
        ]);
        let prs = self.list(args, &format!("PRs labeled {label}")).await?;
        debug!(label, count = prs.len(), "listed labeled PRs");
        Ok(prs)
    }

    async fn search_prs(&self, query: &str) -> Result<Vec<PullRequestRecord>> {
        debug!(query, "searching PRs");
        let args = to_args(&[
            "pr", "list", "--state", "all", "--search", query, "--limit", SEARCH_LIMIT,
            "--json", PR_LIST_FIELDS,
        ]);
        let prs = self.list(args, &format!("search results for {query}")).await?;
        debug!(query, count = prs.len(), "searched PRs");
        Ok(prs)
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<String> {
        debug!(base = %pr.base, head = %pr.head, draft = pr.draft, "creating PR");
        let mut args = to_args(&[
            "pr", "create", "--base", &pr.base, "--head", &pr.head, "--title", &pr.title,
            "--body", &pr.body,
        ]);
        if pr.draft {
            args.push("--draft".to_string());
        }
        // gh prints the new PR's URL on success
        let url = self.gh(args).await?;
        debug!(url = %url, "created PR");
        Ok(url)
    }

    fn repo(&self) -> Option<&RepoSlug> {
        self.repo.as_ref()
    }
}
