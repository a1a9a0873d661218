//! Backport execution - effectful operations
//!
//! Takes a `BackportPlan` (created by the pure planning functions) and runs
//! each cherry-pick step through the pipeline:
//!
//! branch created -> cherry-picked -> pushed -> composed ->
//! awaiting confirmation -> created
//!
//! Steps run strictly one after another. A failed cherry-pick ends the whole
//! run; so does the operator declining to create a PR.

use crate::backport::plan::{BackportPlan, BackportStep, compose_body, compose_title};
use crate::backport::progress::{ConfirmPrompt, ProgressCallback, Stage};
use crate::error::{Error, Result};
use crate::git::{CherryPickResult, GitClient, PushResult};
use crate::platform::PlatformService;
use crate::types::{ChangeRequest, NewPullRequest, PrState};
use tracing::{debug, warn};

/// Exit status for a run stopped by a cherry-pick conflict
pub const CONFLICT_EXIT_CODE: u8 = 2;

/// Options for backport execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Remote holding the release branch
    pub base_remote: String,
    /// Remote to push cherry-pick branches to
    pub push_remote: String,
    /// Push with `--force-with-lease` without asking
    pub force_push: bool,
    /// Create PRs as drafts
    pub draft: bool,
    /// Report what would happen without touching git or the platform
    pub dry_run: bool,
}

/// A backport PR created during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBackport {
    /// Original PR number
    pub pr_number: u64,
    /// URL of the new backport PR
    pub url: String,
}

/// How the run ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step was processed
    #[default]
    Completed,
    /// The operator declined to create a PR; later PRs were not processed
    UserAborted {
        /// PR whose backport was declined
        pr_number: u64,
    },
    /// Cherry-pick failed; later PRs were not processed
    Conflict {
        /// PR whose cherry-pick failed
        pr_number: u64,
        /// Branch left checked out for manual resolution
        branch: String,
        /// Captured git output
        details: String,
    },
}

impl RunOutcome {
    /// Process exit status for this outcome
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Conflict { .. } => CONFLICT_EXIT_CODE,
            Self::Completed | Self::UserAborted { .. } => 0,
        }
    }
}

/// Result of backport execution
#[derive(Debug, Clone, Default)]
pub struct BackportExecutionResult {
    /// PRs created, in order
    pub created: Vec<CreatedBackport>,
    /// Original PRs skipped because a backport exists
    pub skipped: Vec<u64>,
    /// How the run ended
    pub outcome: RunOutcome,
}

impl BackportExecutionResult {
    /// Check if every planned step ran
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    /// Process exit status for this run
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

/// Outcome of a single cherry-pick step
enum PickOutcome {
    Created(String),
    UserAborted,
    Conflict(String),
}

/// Execute the backport plan (EFFECTFUL)
///
/// Skips PRs that already have an active backport and runs the pipeline for
/// the rest. In dry-run mode only progress messages are emitted.
///
/// # Arguments
/// * `plan` - The backport plan to execute
/// * `git` - Git client for branch, cherry-pick and push operations
/// * `platform` - Platform service used to create PRs
/// * `confirm` - Operator confirmation port
/// * `progress` - Progress callback for status updates
/// * `options` - Remotes and run flags
pub async fn execute_backport(
    plan: &BackportPlan,
    git: &GitClient,
    platform: &dyn PlatformService,
    confirm: &dyn ConfirmPrompt,
    progress: &dyn ProgressCallback,
    options: &ExecuteOptions,
) -> Result<BackportExecutionResult> {
    let mut result = BackportExecutionResult::default();

    for step in &plan.steps {
        match step {
            BackportStep::Skip { change, .. } => {
                if step.active_candidates().len() > 1 {
                    warn!(
                        pr_number = change.number,
                        count = step.active_candidates().len(),
                        "multiple active backports found"
                    );
                }
                progress.on_message(&step.to_string()).await;
                result.skipped.push(change.number);
            }
            BackportStep::CherryPick {
                change,
                branch,
                head_ref,
                ..
            } => {
                if options.dry_run {
                    progress
                        .on_message(&format!(
                            "Would cherry-pick PR #{} ({}) onto {} as {branch}",
                            change.number,
                            change.short_sha(),
                            plan.release_branch
                        ))
                        .await;
                    continue;
                }

                let outcome = run_pipeline(
                    change,
                    branch,
                    head_ref,
                    &plan.release_branch,
                    git,
                    platform,
                    confirm,
                    progress,
                    options,
                )
                .await?;

                match outcome {
                    PickOutcome::Created(url) => {
                        result.created.push(CreatedBackport {
                            pr_number: change.number,
                            url,
                        });
                    }
                    PickOutcome::UserAborted => {
                        result.outcome = RunOutcome::UserAborted {
                            pr_number: change.number,
                        };
                        break;
                    }
                    PickOutcome::Conflict(details) => {
                        result.outcome = RunOutcome::Conflict {
                            pr_number: change.number,
                            branch: branch.clone(),
                            details,
                        };
                        break;
                    }
                }
            }
        }
    }

    Ok(result)
}

/// Refuse changes that are not merged or have no merge commit
fn ensure_pickable(change: &ChangeRequest) -> Result<()> {
    if change.state != PrState::Merged {
        return Err(Error::Precondition(format!(
            "PR #{} entered the pipeline in state {}",
            change.number, change.state
        )));
    }
    if change.merge_sha.trim().is_empty() {
        return Err(Error::Precondition(format!(
            "PR #{} entered the pipeline without a merge commit",
            change.number
        )));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    change: &ChangeRequest,
    branch: &str,
    head_ref: &str,
    release_branch: &str,
    git: &GitClient,
    platform: &dyn PlatformService,
    confirm: &dyn ConfirmPrompt,
    progress: &dyn ProgressCallback,
    options: &ExecuteOptions,
) -> Result<PickOutcome> {
    ensure_pickable(change)?;
    let number = change.number;

    git.checkout_branch_from(&options.base_remote, release_branch, branch)
        .await?;
    progress.on_stage(number, Stage::BranchCreated).await;

    if let CherryPickResult::Conflict { details } = git.cherry_pick(&change.merge_sha).await? {
        debug!(pr_number = number, branch, "stopping on cherry-pick failure");
        return Ok(PickOutcome::Conflict(details));
    }
    progress.on_stage(number, Stage::CherryPicked).await;

    push_branch(git, confirm, &options.push_remote, branch, options.force_push).await?;
    progress.on_stage(number, Stage::Pushed).await;

    let subject = git.commit_subject(&change.merge_sha).await?;
    let pr = NewPullRequest {
        base: release_branch.to_string(),
        head: head_ref.to_string(),
        title: compose_title(&subject, &change.title, number),
        body: compose_body(number, &change.body),
        draft: options.draft,
    };
    progress.on_stage(number, Stage::Composed).await;

    progress.on_preview(number, &pr).await;
    progress.on_stage(number, Stage::AwaitingConfirmation).await;
    if !confirm.confirm("Create this PR on GitHub?")? {
        debug!(pr_number = number, "PR creation declined");
        return Ok(PickOutcome::UserAborted);
    }

    let url = platform.create_pr(&pr).await?;
    progress.on_stage(number, Stage::Created).await;
    Ok(PickOutcome::Created(url))
}

/// Push, offering a force-with-lease retry on non-fast-forward rejection
async fn push_branch(
    git: &GitClient,
    confirm: &dyn ConfirmPrompt,
    remote: &str,
    branch: &str,
    force: bool,
) -> Result<()> {
    if git.push(remote, branch, force).await? == PushResult::Pushed {
        return Ok(());
    }

    let prompt = format!("Remote branch '{branch}' is ahead on {remote}. Force-with-lease push?");
    if confirm.confirm(&prompt)? && git.push(remote, branch, true).await? == PushResult::Pushed {
        return Ok(());
    }

    Err(Error::PushRejected {
        branch: branch.to_string(),
        remote: remote.to_string(),
    })
}
