//! Backport engine
//!
//! Four phases, mirroring how the CLI drives it:
//! 1. Gather - load PRs and sequence them in merge order (effectful, read-only)
//! 2. Detect - look for existing backports of each PR (effectful, read-only)
//! 3. Plan - create `BackportPlan` (pure, testable)
//! 4. Execute - branch, cherry-pick, push, confirm, create (effectful)

mod detect;
mod execute;
mod plan;
mod progress;
mod sequence;
mod source;

pub use detect::{backport_queries, classify, find_all_backports, find_backports, references_pr};
pub use execute::{
    BackportExecutionResult, CONFLICT_EXIT_CODE, CreatedBackport, ExecuteOptions, RunOutcome,
    execute_backport,
};
pub use plan::{
    BackportPlan, BackportStep, PlanOptions, branch_name, compose_body, compose_title,
    create_backport_plan, fork_owner, head_ref, sanitize_branch_component,
};
pub use progress::{ConfirmPrompt, NoopProgress, ProgressCallback, Stage};
pub use sequence::{sequence, sort_by_merge_order, sort_pending};
pub use source::{LoadedChanges, PrSource, load_change_requests};
