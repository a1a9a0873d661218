//! Merge-order sequencing

use super::source::LoadedChanges;
use crate::types::{ChangeRequest, PendingChangeRequest};

/// Sort merged PRs into the order they landed on the main line
///
/// The sort is stable, so PRs merged at the same instant keep their input
/// order.
pub fn sort_by_merge_order(changes: &mut [ChangeRequest]) {
    changes.sort_by_key(|c| c.merged_at);
}

/// Sort pending PRs by number, for a deterministic report
pub fn sort_pending(pending: &mut [PendingChangeRequest]) {
    pending.sort_by_key(|p| p.number);
}

/// Sequence a loaded working set in place
pub fn sequence(mut loaded: LoadedChanges) -> LoadedChanges {
    sort_by_merge_order(&mut loaded.completed);
    sort_pending(&mut loaded.pending);
    loaded
}
