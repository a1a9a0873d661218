//! Repository detection from git remote URLs

use crate::types::RepoSlug;
use url::Url;

/// Parse `OWNER/REPO` (and host) out of a git remote URL
///
/// Supports `https://host/OWNER/REPO(.git)`, `ssh://git@host/OWNER/REPO(.git)`
/// and scp-like `git@host:OWNER/REPO(.git)`. Returns `None` for anything
/// else, including paths that are not exactly two segments deep.
pub fn parse_repo_slug(remote_url: &str) -> Option<RepoSlug> {
    let url = remote_url.trim();

    let (host, path) = if url.contains("://") {
        let parsed = Url::parse(url).ok()?;
        (parsed.host_str()?.to_string(), parsed.path().to_string())
    } else {
        // scp-like syntax: [user@]host:path
        let (authority, path) = url.split_once(':')?;
        let host = authority.rsplit('@').next()?;
        (host.to_string(), path.to_string())
    };

    if host.is_empty() {
        return None;
    }

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, name) = path.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }

    Some(RepoSlug {
        host,
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
