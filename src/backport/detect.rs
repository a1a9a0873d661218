//! Heuristic detection of existing backports
//!
//! Searches the release branch's PRs for anything that references the
//! original PR by number, URL or title. The platform search may over-match,
//! so every hit is re-checked locally before it counts.
//!
//! This is best-effort. A backport that mentions the original PR in none of
//! the recognised ways is missed (and would be created twice); an unrelated
//! PR with an identical title is treated as a backport (and the original is
//! skipped). Both are accepted limitations.

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{BackportCandidate, ChangeRequest, PrState, PullRequestRecord};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

static PR_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPR\s*#?(\d+)\b").expect("valid regex"));

/// Platform search queries used to find backports of `pr_number`
pub fn backport_queries(pr_number: u64, release_branch: &str, title: &str) -> Vec<String> {
    let mut queries = vec![
        format!(r#"base:{release_branch} "PR #{pr_number}" in:title,body"#),
        format!(r#"base:{release_branch} "pull/{pr_number}" in:body"#),
    ];
    let title = title.replace('"', "");
    let title = title.trim();
    if !title.is_empty() {
        queries.push(format!(r#"base:{release_branch} "{title}" in:title"#));
    }
    queries
}

/// Whether a search hit really refers to the original PR
///
/// Accepts a `PR #<n>` reference in title or body, a `/pull/<n>` URL
/// fragment, the original title as a case-insensitive substring of the
/// hit's title, or a `(#<n>)` marker in the hit's title.
pub fn references_pr(record: &PullRequestRecord, pr_number: u64, original_title: &str) -> bool {
    let haystack = format!("{}\n{}", record.title, record.body);

    let mentions_number = PR_REFERENCE
        .captures_iter(&haystack)
        .any(|c| c[1].parse::<u64>().is_ok_and(|n| n == pr_number));
    let mentions_url = haystack.contains(&format!("/pull/{pr_number}"));
    let title_lc = original_title.to_lowercase();
    let same_title = !title_lc.is_empty() && record.title.to_lowercase().contains(&title_lc);
    let has_marker = record.title.contains(&format!("(#{pr_number})"));

    mentions_number || mentions_url || same_title || has_marker
}

/// Order candidates: merged (most recent first), then open, then the rest
pub fn classify(candidates: Vec<BackportCandidate>) -> Vec<BackportCandidate> {
    let (mut merged, rest): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.state == PrState::Merged);
    let (open, other): (Vec<_>, Vec<_>) = rest.into_iter().partition(|c| c.state == PrState::Open);

    merged.sort_by(|a, b| b.merged_at.cmp(&a.merged_at));
    merged.into_iter().chain(open).chain(other).collect()
}

/// Find existing backports of `change` targeting `release_branch`
pub async fn find_backports(
    platform: &dyn PlatformService,
    change: &ChangeRequest,
    release_branch: &str,
) -> Result<Vec<BackportCandidate>> {
    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    for query in backport_queries(change.number, release_branch, &change.title) {
        for record in platform.search_prs(&query).await? {
            if seen.insert(record.number) {
                hits.push(record);
            }
        }
    }

    let candidates: Vec<BackportCandidate> = hits
        .iter()
        .filter(|r| references_pr(r, change.number, &change.title))
        .map(BackportCandidate::from)
        .collect();

    debug!(
        pr_number = change.number,
        hits = hits.len(),
        matches = candidates.len(),
        "searched for existing backports"
    );
    Ok(classify(candidates))
}

/// Find existing backports for every change, keyed by PR number
pub async fn find_all_backports(
    platform: &dyn PlatformService,
    changes: &[ChangeRequest],
    release_branch: &str,
) -> Result<HashMap<u64, Vec<BackportCandidate>>> {
    let mut result = HashMap::new();
    for change in changes {
        let candidates = find_backports(platform, change, release_branch).await?;
        result.insert(change.number, candidates);
    }
    Ok(result)
}
