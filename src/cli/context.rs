//! Shared command context for the backport command
//!
//! Holds the process runner and git client, and resolves which repositories
//! the base and push remotes point at.

use backporter::error::{Error, Result};
use backporter::exec::CommandRunner;
use backporter::git::GitClient;
use backporter::platform::{GhCliService, parse_repo_slug};
use backporter::types::RepoSlug;
use std::sync::Arc;
use tracing::{debug, warn};

/// Repositories behind the configured remotes
#[derive(Debug, Clone, Default)]
pub struct ResolvedRepos {
    /// Repository PRs are opened against (`--repo`, else the base remote)
    pub base: Option<RepoSlug>,
    /// Repository branches are pushed to
    pub push: Option<RepoSlug>,
}

/// Shared context for CLI commands that interact with git and the platform
pub struct CommandContext {
    /// Runner for every external command
    pub runner: Arc<dyn CommandRunner>,
    /// Git client
    pub git: GitClient,
}

impl CommandContext {
    /// Create a new command context around `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        let git = GitClient::new(Arc::clone(&runner));
        Self { runner, git }
    }

    /// Platform service pinned to `repo` (or `gh`'s own repo context)
    pub fn platform(&self, repo: Option<RepoSlug>) -> GhCliService {
        GhCliService::new(Arc::clone(&self.runner), repo)
    }

    /// Fail unless the working tree is clean (or dirt is allowed)
    pub async fn ensure_clean_worktree(&self, allow_dirty: bool) -> Result<()> {
        if allow_dirty {
            return Ok(());
        }
        if self.git.is_worktree_clean().await? {
            Ok(())
        } else {
            Err(Error::DirtyWorktree)
        }
    }

    /// Work out base and push repositories from `--repo` and the remotes
    ///
    /// Remotes that are missing or not parseable resolve to `None`.
    pub async fn resolve_repos(
        &self,
        repo_override: Option<&RepoSlug>,
        base_remote: &str,
        push_remote: &str,
    ) -> ResolvedRepos {
        let base_remote_repo = self.remote_repo(base_remote).await;
        let push = self.remote_repo(push_remote).await;
        let base = repo_override.cloned().or(base_remote_repo);
        debug!(base = ?base, push = ?push, "resolved repositories");
        ResolvedRepos { base, push }
    }

    async fn remote_repo(&self, remote: &str) -> Option<RepoSlug> {
        match self.git.remote_url(remote).await {
            Ok(url) => {
                let slug = parse_repo_slug(&url);
                if slug.is_none() {
                    warn!(remote, url = %url, "remote URL does not name an OWNER/REPO");
                }
                slug
            }
            Err(e) => {
                debug!(remote, error = %e, "could not read remote URL");
                None
            }
        }
    }
}
