//! Progress reporting and operator confirmation ports

use crate::error::Result;
use crate::types::NewPullRequest;
use async_trait::async_trait;

/// Stages a change passes through in the cherry-pick pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Branch created (or reset) from the release branch
    BranchCreated,
    /// Merge commit cherry-picked onto the branch
    CherryPicked,
    /// Branch pushed to the push remote
    Pushed,
    /// PR title and body composed
    Composed,
    /// Waiting for the operator to confirm creation
    AwaitingConfirmation,
    /// PR created
    Created,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BranchCreated => write!(f, "branch created"),
            Self::CherryPicked => write!(f, "cherry-picked"),
            Self::Pushed => write!(f, "pushed"),
            Self::Composed => write!(f, "composed"),
            Self::AwaitingConfirmation => write!(f, "awaiting confirmation"),
            Self::Created => write!(f, "created"),
        }
    }
}

/// Receives progress updates while the pipeline runs
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A change reached a pipeline stage
    async fn on_stage(&self, pr_number: u64, stage: Stage);

    /// A PR is about to be proposed to the operator
    async fn on_preview(&self, pr_number: u64, pr: &NewPullRequest);

    /// Free-form status message
    async fn on_message(&self, message: &str);
}

/// Progress callback that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_stage(&self, _pr_number: u64, _stage: Stage) {}
    async fn on_preview(&self, _pr_number: u64, _pr: &NewPullRequest) {}
    async fn on_message(&self, _message: &str) {}
}

/// Asks the operator a yes/no question
///
/// Any `Fn(&str) -> bool` works, which keeps the pipeline testable without
/// a terminal.
pub trait ConfirmPrompt: Send + Sync {
    /// Return `true` only if the operator explicitly agreed
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}
