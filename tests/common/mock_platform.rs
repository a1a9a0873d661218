//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use backporter::error::{Error, Result};
use backporter::platform::PlatformService;
use backporter::types::{NewPullRequest, PullRequestRecord, RepoSlug};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `list_labeled_prs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLabeledCall {
    pub base: String,
    pub label: String,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing backport PR numbers (starting at 1000)
/// - Call tracking for verification
/// - Configurable responses per PR number and per search query
/// - Error injection for failure path testing
pub struct MockPlatformService {
    repo: Option<RepoSlug>,
    next_pr_number: AtomicU64,
    view_responses: Mutex<HashMap<u64, PullRequestRecord>>,
    labeled_response: Mutex<Vec<PullRequestRecord>>,
    search_responses: Mutex<HashMap<String, Vec<PullRequestRecord>>>,
    search_fallback: Mutex<Vec<PullRequestRecord>>,
    // Call tracking
    view_calls: Mutex<Vec<u64>>,
    list_labeled_calls: Mutex<Vec<ListLabeledCall>>,
    search_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<NewPullRequest>>,
    // Error injection
    error_on_view: Mutex<Option<String>>,
    error_on_search: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    /// Create a mock using `gh`'s own repo context
    pub fn new() -> Self {
        Self {
            repo: None,
            next_pr_number: AtomicU64::new(1000),
            view_responses: Mutex::new(HashMap::new()),
            labeled_response: Mutex::new(Vec::new()),
            search_responses: Mutex::new(HashMap::new()),
            search_fallback: Mutex::new(Vec::new()),
            view_calls: Mutex::new(Vec::new()),
            list_labeled_calls: Mutex::new(Vec::new()),
            search_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_view: Mutex::new(None),
            error_on_search: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    /// Create a mock pinned to `owner/name`
    pub fn with_repo(owner: &str, name: &str) -> Self {
        Self {
            repo: Some(RepoSlug::new(owner, name)),
            ..Self::new()
        }
    }

    // === Error injection methods ===

    /// Make `view_pr` return an error
    pub fn fail_view(&self, msg: &str) {
        *self.error_on_view.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `search_prs` return an error
    pub fn fail_search(&self, msg: &str) {
        *self.error_on_search.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Set the response for `view_pr`, keyed by the record's number
    pub fn set_view_response(&self, record: PullRequestRecord) {
        self.view_responses
            .lock()
            .unwrap()
            .insert(record.number, record);
    }

    /// Set the response for `list_labeled_prs`
    pub fn set_labeled_response(&self, records: Vec<PullRequestRecord>) {
        *self.labeled_response.lock().unwrap() = records;
    }

    /// Set the response for one exact search query
    pub fn set_search_response(&self, query: &str, records: Vec<PullRequestRecord>) {
        self.search_responses
            .lock()
            .unwrap()
            .insert(query.to_string(), records);
    }

    /// Set the response for every search query without an exact response
    pub fn set_search_fallback(&self, records: Vec<PullRequestRecord>) {
        *self.search_fallback.lock().unwrap() = records;
    }

    // === Call inspection ===

    pub fn get_view_calls(&self) -> Vec<u64> {
        self.view_calls.lock().unwrap().clone()
    }

    pub fn get_list_labeled_calls(&self) -> Vec<ListLabeledCall> {
        self.list_labeled_calls.lock().unwrap().clone()
    }

    pub fn get_search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<NewPullRequest> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Assert a PR was created from `head` into `base`
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}), got: {calls:?}"
        );
    }

    /// Assert no PR was created
    pub fn assert_create_pr_not_called(&self) {
        let calls = self.get_create_pr_calls();
        assert!(calls.is_empty(), "Expected no create_pr calls, got: {calls:?}");
    }

    pub fn create_call_count(&self) -> usize {
        self.create_pr_calls.lock().unwrap().len()
    }
}

fn injected(msg: &str) -> Error {
    Error::CommandFailed {
        command: "gh (mock)".to_string(),
        status: 1,
        stdout: String::new(),
        stderr: msg.to_string(),
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn view_pr(&self, pr_number: u64) -> Result<PullRequestRecord> {
        self.view_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.error_on_view.lock().unwrap().as_ref() {
            return Err(injected(msg));
        }

        self.view_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| injected(&format!("no pull requests found for #{pr_number}")))
    }

    async fn list_labeled_prs(&self, base: &str, label: &str) -> Result<Vec<PullRequestRecord>> {
        self.list_labeled_calls.lock().unwrap().push(ListLabeledCall {
            base: base.to_string(),
            label: label.to_string(),
        });
        Ok(self.labeled_response.lock().unwrap().clone())
    }

    async fn search_prs(&self, query: &str) -> Result<Vec<PullRequestRecord>> {
        self.search_calls.lock().unwrap().push(query.to_string());

        if let Some(msg) = self.error_on_search.lock().unwrap().as_ref() {
            return Err(injected(msg));
        }

        let exact = self.search_responses.lock().unwrap().get(query).cloned();
        Ok(exact.unwrap_or_else(|| self.search_fallback.lock().unwrap().clone()))
    }

    async fn create_pr(&self, pr: &NewPullRequest) -> Result<String> {
        self.create_pr_calls.lock().unwrap().push(pr.clone());

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(injected(msg));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://github.com/test/repo/pull/{number}"))
    }

    fn repo(&self) -> Option<&RepoSlug> {
        self.repo.as_ref()
    }
}
