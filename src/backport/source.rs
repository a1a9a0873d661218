//! Loading the working set of PRs to backport

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{ChangeRequest, PendingChangeRequest, PrState};
use tracing::debug;

/// Where the PRs to backport come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrSource {
    /// Explicit PR numbers; every one must be merged
    Explicit(Vec<u64>),
    /// All PRs on the main line carrying a backport label
    Label {
        /// Label name (e.g. `backport_1.7.2511`)
        label: String,
        /// Main line branch the labeled PRs target
        main_branch: String,
    },
}

/// The working set, split by whether each PR can be backported yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedChanges {
    /// Merged PRs with a resolved merge commit
    pub completed: Vec<ChangeRequest>,
    /// Labeled PRs that are still open or were closed unmerged
    pub pending: Vec<PendingChangeRequest>,
}

/// Resolve the working set from the platform
///
/// In explicit mode any PR that is not merged, or lacks a merge commit,
/// aborts the whole load. In label mode unmerged PRs are collected as
/// pending instead, and merged ones are re-fetched so the merge commit is
/// guaranteed to be present.
pub async fn load_change_requests(
    platform: &dyn PlatformService,
    source: &PrSource,
) -> Result<LoadedChanges> {
    let mut loaded = LoadedChanges::default();

    match source {
        PrSource::Explicit(numbers) => {
            for &number in numbers {
                let record = platform.view_pr(number).await?;
                loaded.completed.push(ChangeRequest::from_record(&record)?);
            }
        }
        PrSource::Label { label, main_branch } => {
            let labeled = platform.list_labeled_prs(main_branch, label).await?;
            for record in &labeled {
                if record.state == PrState::Merged {
                    let full = platform.view_pr(record.number).await?;
                    loaded.completed.push(ChangeRequest::from_record(&full)?);
                } else {
                    debug!(pr_number = record.number, state = %record.state, "labeled PR not merged");
                    loaded.pending.push(PendingChangeRequest::from(record));
                }
            }
        }
    }

    debug!(
        completed = loaded.completed.len(),
        pending = loaded.pending.len(),
        "loaded change requests"
    );
    Ok(loaded)
}
