//! Backport planning - pure functions for creating backport plans
//!
//! This module contains the pure, testable logic for deciding what happens
//! to each PR and for composing branch names, titles and bodies. No I/O
//! happens here.

use crate::types::{BackportCandidate, ChangeRequest, PendingChangeRequest, RepoSlug};
use regex::Regex;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::LazyLock;

static UNSAFE_BRANCH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._/-]+").expect("valid regex"));

/// Options for backport planning
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Release branch the backports target
    pub release_branch: String,
    /// Prefix for cherry-pick branch names
    pub branch_prefix: String,
    /// Fork owner to qualify head refs with, when pushing to a fork
    pub head_owner: Option<String>,
}

/// A single step in the backport plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackportStep {
    /// Cherry-pick this PR and open a backport
    CherryPick {
        /// The PR to backport
        change: ChangeRequest,
        /// Local branch to create
        branch: String,
        /// Head reference for the new PR
        head_ref: String,
        /// Inactive (closed) backport candidates, for reporting
        candidates: Vec<BackportCandidate>,
    },
    /// A backport already exists (open or merged)
    Skip {
        /// The PR that already has a backport
        change: ChangeRequest,
        /// All candidates found; at least one is active
        candidates: Vec<BackportCandidate>,
    },
}

impl BackportStep {
    /// The PR this step is about
    pub const fn change(&self) -> &ChangeRequest {
        match self {
            Self::CherryPick { change, .. } | Self::Skip { change, .. } => change,
        }
    }

    /// Every backport candidate found for the PR
    pub fn candidates(&self) -> &[BackportCandidate] {
        match self {
            Self::CherryPick { candidates, .. } | Self::Skip { candidates, .. } => candidates,
        }
    }

    /// Candidates that are open or merged
    pub fn active_candidates(&self) -> Vec<&BackportCandidate> {
        self.candidates().iter().filter(|c| c.is_active()).collect()
    }
}

impl std::fmt::Display for BackportStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CherryPick { change, branch, .. } => {
                write!(f, "cherry-pick PR #{} onto {branch}: {}", change.number, change.title)
            }
            Self::Skip { change, .. } => {
                let active = self.active_candidates();
                match active.as_slice() {
                    [only] => write!(
                        f,
                        "skip PR #{} (backport {}): {}",
                        change.number,
                        only.state.to_string().to_lowercase(),
                        only.url
                    ),
                    many => {
                        let links: Vec<&str> = many.iter().map(|c| c.url.as_str()).collect();
                        write!(
                            f,
                            "skip PR #{} (multiple backports in progress/merged): {}",
                            change.number,
                            links.join(", ")
                        )
                    }
                }
            }
        }
    }
}

/// Backport plan - the functional core output
///
/// Created by `create_backport_plan()` (pure) and executed by
/// `execute_backport()` (effectful).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportPlan {
    /// Release branch every step targets
    pub release_branch: String,
    /// Steps in merge order
    pub steps: Vec<BackportStep>,
    /// Labeled PRs that are not merged yet, sorted by number
    pub pending: Vec<PendingChangeRequest>,
}

impl BackportPlan {
    /// Check if the plan has nothing to cherry-pick
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pick_count() == 0
    }

    /// Count PRs that will be cherry-picked
    #[must_use]
    pub fn pick_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, BackportStep::CherryPick { .. }))
            .count()
    }

    /// Count PRs skipped because a backport exists
    #[must_use]
    pub fn skip_count(&self) -> usize {
        self.steps.len() - self.pick_count()
    }
}

/// Create a backport plan (PURE - no I/O, easily testable)
///
/// # Arguments
/// * `changes` - Merged PRs, already in merge order
/// * `candidates` - Backport candidates per PR number, from detection
/// * `pending` - Unmerged labeled PRs (reported only)
/// * `options` - Branch naming and fork settings
#[must_use]
pub fn create_backport_plan<S: BuildHasher>(
    changes: &[ChangeRequest],
    candidates: &HashMap<u64, Vec<BackportCandidate>, S>,
    pending: Vec<PendingChangeRequest>,
    options: &PlanOptions,
) -> BackportPlan {
    let steps = changes
        .iter()
        .map(|change| {
            let found = candidates.get(&change.number).cloned().unwrap_or_default();
            if found.iter().any(BackportCandidate::is_active) {
                BackportStep::Skip {
                    change: change.clone(),
                    candidates: found,
                }
            } else {
                let branch =
                    branch_name(&options.branch_prefix, &options.release_branch, change.number);
                BackportStep::CherryPick {
                    change: change.clone(),
                    head_ref: head_ref(&branch, options.head_owner.as_deref()),
                    branch,
                    candidates: found,
                }
            }
        })
        .collect();

    BackportPlan {
        release_branch: options.release_branch.clone(),
        steps,
        pending,
    }
}

/// Make a release branch name safe to embed in another branch name
pub fn sanitize_branch_component(name: &str) -> String {
    UNSAFE_BRANCH_CHARS
        .replace_all(name, "-")
        .trim_matches('-')
        .to_string()
}

/// Name of the cherry-pick branch for `pr_number`
///
/// `cherrypick` + `release/1.7` + 42 gives `cherrypick/release/1.7/pr-42`.
pub fn branch_name(prefix: &str, release_branch: &str, pr_number: u64) -> String {
    format!(
        "{prefix}/{}/pr-{pr_number}",
        sanitize_branch_component(release_branch)
    )
}

/// Head reference for a PR, qualified with the fork owner if there is one
pub fn head_ref(branch: &str, head_owner: Option<&str>) -> String {
    head_owner.map_or_else(|| branch.to_string(), |owner| format!("{owner}:{branch}"))
}

/// Owner to qualify head refs with when pushing to a different repository
pub fn fork_owner(base: &RepoSlug, push: Option<&RepoSlug>) -> Option<String> {
    push.filter(|p| *p != base).map(|p| p.owner.clone())
}

/// Title for the backport PR
///
/// Uses the commit subject (falling back to the original PR title) and
/// appends `(#<n>)` unless it already ends with that marker.
pub fn compose_title(subject: &str, original_title: &str, pr_number: u64) -> String {
    let subject = subject.trim_end();
    let base = if subject.is_empty() {
        original_title.trim_end()
    } else {
        subject
    };

    let marker = format!("(#{pr_number})");
    if base.ends_with(&marker) {
        base.to_string()
    } else if base.is_empty() {
        marker
    } else {
        format!("{base} {marker}")
    }
}

/// Body for the backport PR: a provenance line, then the original body
pub fn compose_body(pr_number: u64, original_body: &str) -> String {
    let body = format!("Clean cherry pick of PR #{pr_number}\n\n{original_body}");
    format!("{}\n", body.trim_end())
}
