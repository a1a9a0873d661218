//! Core types for backporter

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Host used when a repository slug carries no explicit host
pub const DEFAULT_HOST: &str = "github.com";

// =============================================================================
// Pull request state
// =============================================================================

/// Lifecycle state of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
    /// Any state this tool does not know about (kept verbatim, upper-cased)
    Other(String),
}

impl PrState {
    /// Whether a backport in this state suppresses creating another one
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Merged)
    }
}

impl From<&str> for PrState {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            "MERGED" => Self::Merged,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PrState {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Merged => write!(f, "MERGED"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

// =============================================================================
// Wire format
// =============================================================================

/// Merge commit reference as returned by the code-hosting CLI
///
/// Usually an object with an `oid`, but older API shapes use a bare string
/// or `sha`/`id` keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MergeCommitRef {
    /// Bare SHA string
    Sha(String),
    /// Object form
    Object {
        /// Git object ID
        #[serde(default)]
        oid: Option<String>,
        /// Alternate key for the SHA
        #[serde(default)]
        sha: Option<String>,
        /// Alternate key for the SHA
        #[serde(default)]
        id: Option<String>,
    },
}

impl MergeCommitRef {
    /// First non-empty SHA this reference carries
    pub fn sha(&self) -> Option<&str> {
        match self {
            Self::Sha(sha) => Some(sha.trim()).filter(|s| !s.is_empty()),
            Self::Object { oid, sha, id } => [oid, sha, id]
                .into_iter()
                .filter_map(|v| v.as_deref().map(str::trim))
                .find(|s| !s.is_empty()),
        }
    }
}

/// A pull request exactly as the code-hosting CLI reports it
///
/// Fields use the CLI's JSON names (`mergedAt`, `mergeCommit`). Nothing here
/// is validated; see [`ChangeRequest::from_record`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRecord {
    /// PR number
    pub number: u64,
    /// PR title
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    /// PR body
    #[serde(default, deserialize_with = "nullable_string")]
    pub body: String,
    /// Web URL
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    /// Lifecycle state
    pub state: PrState,
    /// When the PR was merged
    #[serde(default, deserialize_with = "merge_timestamp")]
    pub merged_at: Option<DateTime<Utc>>,
    /// Merge (or squash) commit
    #[serde(default)]
    pub merge_commit: Option<MergeCommitRef>,
}

impl PullRequestRecord {
    /// Merge commit SHA, if the record carries one
    pub fn merge_sha(&self) -> Option<&str> {
        self.merge_commit.as_ref().and_then(MergeCommitRef::sha)
    }
}

fn nullable_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// `mergedAt` is null, empty or the zero timestamp for unmerged PRs.
fn merge_timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(d)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("0001-01-01") {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(serde::de::Error::custom)
}

// =============================================================================
// Engine values
// =============================================================================

/// A merged pull request on the main line, validated for backporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Web URL
    pub url: String,
    /// When the PR was merged into the main line
    pub merged_at: DateTime<Utc>,
    /// SHA of the merge (squash) commit
    pub merge_sha: String,
    /// Lifecycle state (always `Merged` once validated)
    pub state: PrState,
}

impl ChangeRequest {
    /// Validate a platform record into a `ChangeRequest`
    ///
    /// Fails unless the record is merged, has a merge timestamp and has a
    /// merge commit SHA.
    pub fn from_record(record: &PullRequestRecord) -> Result<Self> {
        if record.state != PrState::Merged {
            return Err(Error::NotMerged {
                number: record.number,
                state: record.state.clone(),
            });
        }
        let merged_at = record
            .merged_at
            .ok_or(Error::MissingMergeTime(record.number))?;
        let merge_sha = record
            .merge_sha()
            .ok_or(Error::MissingMergeCommit(record.number))?
            .to_string();

        Ok(Self {
            number: record.number,
            title: record.title.trim_end().to_string(),
            body: record.body.trim_end().to_string(),
            url: record.url.trim().to_string(),
            merged_at,
            merge_sha,
            state: PrState::Merged,
        })
    }

    /// First eight characters of the merge SHA
    pub fn short_sha(&self) -> &str {
        self.merge_sha.get(..8).unwrap_or(&self.merge_sha)
    }
}

/// A labeled PR that has not (yet) been merged into the main line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChangeRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Web URL
    pub url: String,
    /// Lifecycle state (OPEN, CLOSED, ...)
    pub state: PrState,
}

impl PendingChangeRequest {
    /// Human description of why this PR is not being backported
    pub fn status(&self) -> &'static str {
        match self.state {
            PrState::Open => "pending merge into main",
            _ => "abandoned",
        }
    }
}

impl From<&PullRequestRecord> for PendingChangeRequest {
    fn from(record: &PullRequestRecord) -> Self {
        Self {
            number: record.number,
            title: record.title.trim_end().to_string(),
            url: record.url.trim().to_string(),
            state: record.state.clone(),
        }
    }
}

/// An existing PR against the release branch that looks like a backport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportCandidate {
    /// Lifecycle state of the backport PR
    pub state: PrState,
    /// Web URL
    pub url: String,
    /// PR number
    pub number: u64,
    /// When the backport was merged, if it was
    pub merged_at: Option<DateTime<Utc>>,
}

impl BackportCandidate {
    /// Whether this candidate means the backport already exists
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

impl From<&PullRequestRecord> for BackportCandidate {
    fn from(record: &PullRequestRecord) -> Self {
        Self {
            state: record.state.clone(),
            url: record.url.trim().to_string(),
            number: record.number,
            merged_at: record.merged_at,
        }
    }
}

/// A pull request about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Base (release) branch
    pub base: String,
    /// Head reference, fork-qualified when pushing to a fork
    pub head: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Create as draft
    pub draft: bool,
}

impl NewPullRequest {
    /// First `max_lines` lines of the body and whether more were cut
    pub fn body_preview(&self, max_lines: usize) -> (Vec<&str>, bool) {
        let lines: Vec<&str> = self.body.lines().collect();
        let truncated = lines.len() > max_lines;
        (lines.into_iter().take(max_lines).collect(), truncated)
    }
}

// =============================================================================
// Repository identity
// =============================================================================

/// An `OWNER/REPO` pair on a code-hosting host
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    /// Host (e.g. `github.com`)
    pub host: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoSlug {
    /// Create a slug on the default host
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Value for the CLI's `-R` flag (`HOST/` only for non-default hosts)
    pub fn cli_arg(&self) -> String {
        if self.host == DEFAULT_HOST {
            format!("{}/{}", self.owner, self.name)
        } else {
            format!("{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().trim_matches('/').split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidRepo(s.to_string()));
        }
        match parts.as_slice() {
            [owner, name] => Ok(Self::new(*owner, *name)),
            [host, owner, name] => Ok(Self {
                host: (*host).to_string(),
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(Error::InvalidRepo(s.to_string())),
        }
    }
}
