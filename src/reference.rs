//! PR reference parsing
//!
//! Turns the free-form references a user types (`123`, `#123`, or a PR URL)
//! into PR numbers.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static PULL_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/pull/(\d+)").expect("valid regex"));

static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("valid regex"));

/// Parse a single PR reference into a PR number
///
/// Accepts `"123"`, `"#123"`, or any string containing `/pull/123`.
pub fn parse_pr_reference(reference: &str) -> Result<u64> {
    let s = reference.trim();
    let captures = if s.contains("/pull/") {
        PULL_PATH.captures(s)
    } else {
        TRAILING_NUMBER.captures(s.trim_start_matches('#'))
    };

    captures
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| Error::InvalidReference(reference.to_string()))
}

/// Parse PR references, dropping duplicates but keeping first-seen order
pub fn parse_pr_references<S: AsRef<str>>(references: &[S]) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    let mut numbers = Vec::new();
    for reference in references {
        let number = parse_pr_reference(reference.as_ref())?;
        if seen.insert(number) {
            numbers.push(number);
        }
    }
    Ok(numbers)
}
