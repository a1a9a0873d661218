//! Error types for backporter
//!
//! Every failure that ends a run is an [`Error`]. A cherry-pick conflict is
//! deliberately absent: it is reported as
//! [`RunOutcome::Conflict`](crate::backport::RunOutcome::Conflict) so the
//! binary can give it its own exit status.

use crate::types::PrState;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a backport run
#[derive(Debug, Error)]
pub enum Error {
    // =========================================================================
    // Input errors
    // =========================================================================
    /// A PR reference contained no PR number
    #[error("could not parse PR number from: {0}")]
    InvalidReference(String),

    /// No PR references and no label mode
    #[error("must provide PR numbers, or use --from-backport-label")]
    NoReferences,

    /// Both explicit PR references and label mode were requested
    #[error("PR numbers cannot be combined with --from-backport-label")]
    ConflictingSources,

    /// `--repo` or a remote URL did not name an OWNER/REPO
    #[error("invalid repository '{0}': expected OWNER/REPO or HOST/OWNER/REPO")]
    InvalidRepo(String),

    // =========================================================================
    // Precondition errors
    // =========================================================================
    /// Working tree has uncommitted changes
    #[error("working tree is not clean; commit/stash changes or re-run with --allow-dirty")]
    DirtyWorktree,

    /// An explicitly requested PR is not merged
    #[error("PR #{number} is not merged (state={state})")]
    NotMerged {
        /// PR number
        number: u64,
        /// State reported by the platform
        state: PrState,
    },

    /// A merged PR has no merge timestamp
    #[error("PR #{0} has no mergedAt timestamp")]
    MissingMergeTime(u64),

    /// A merged PR has no merge commit SHA
    #[error("PR #{0} has no merge commit SHA (mergeCommit missing)")]
    MissingMergeCommit(u64),

    /// Base repository could not be derived from `--repo` or the base remote
    #[error("could not determine base repo from git remote '{0}'; pass --repo OWNER/REPO")]
    UnknownBaseRepo(String),

    /// A change entered the pipeline without satisfying its invariants
    #[error("precondition violated: {0}")]
    Precondition(String),

    // =========================================================================
    // External tool failures
    // =========================================================================
    /// A subprocess exited non-zero
    #[error("command failed ({status}): {command}\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status (-1 when killed by a signal)
        status: i32,
        /// Captured stdout
        stdout: String,
        /// Captured stderr
        stderr: String,
    },

    /// A subprocess could not be started
    #[error("failed to run {command}: {source}")]
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Platform JSON did not have the expected shape
    #[error("failed to parse {context}: {source}")]
    Json {
        /// What was being parsed
        context: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Recoverable-then-declined
    // =========================================================================
    /// Push was rejected as non-fast-forward and force push was declined
    #[error("push of '{branch}' to {remote} rejected (non-fast-forward); re-run with --force-push to overwrite")]
    PushRejected {
        /// Local branch
        branch: String,
        /// Push remote
        remote: String,
    },

    // =========================================================================
    // Ambient
    // =========================================================================
    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Interactive prompt failed
    #[error("failed to read confirmation: {0}")]
    Prompt(String),
}
