//! Shared test fixtures

#![allow(dead_code, unused_imports)]

mod fake_runner;
mod mock_platform;

pub use fake_runner::FakeRunner;
pub use mock_platform::{ListLabeledCall, MockPlatformService};

use backporter::backport::{ConfirmPrompt, ProgressCallback, Stage};
use backporter::error::Result;
use backporter::types::{
    BackportCandidate, ChangeRequest, MergeCommitRef, NewPullRequest, PrState, PullRequestRecord,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Timestamp `minutes` after a fixed origin
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

/// A 40-character SHA derived from `number`
pub fn sha_for(number: u64) -> String {
    format!("{number:0>8}{}", "a".repeat(32))
}

/// A validated merged change
pub fn make_change(number: u64, merged_minute: i64, title: &str) -> ChangeRequest {
    ChangeRequest {
        number,
        title: title.to_string(),
        body: format!("Body of #{number}"),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        merged_at: at(merged_minute),
        merge_sha: sha_for(number),
        state: PrState::Merged,
    }
}

/// A merged record as the platform would report it
pub fn merged_record(number: u64, merged_minute: i64, title: &str) -> PullRequestRecord {
    PullRequestRecord {
        number,
        title: title.to_string(),
        body: format!("Body of #{number}"),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        state: PrState::Merged,
        merged_at: Some(at(merged_minute)),
        merge_commit: Some(MergeCommitRef::Sha(sha_for(number))),
    }
}

/// An unmerged record in `state`
pub fn unmerged_record(number: u64, state: PrState, title: &str) -> PullRequestRecord {
    PullRequestRecord {
        number,
        title: title.to_string(),
        body: String::new(),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        state,
        merged_at: None,
        merge_commit: None,
    }
}

/// A search hit against the release branch
pub fn backport_record(number: u64, state: PrState, title: &str, body: &str) -> PullRequestRecord {
    PullRequestRecord {
        number,
        title: title.to_string(),
        body: body.to_string(),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        merged_at: (state == PrState::Merged).then(|| at(500 + i64::try_from(number).unwrap())),
        state,
        merge_commit: None,
    }
}

/// A backport candidate in `state`
pub fn candidate(number: u64, state: PrState) -> BackportCandidate {
    BackportCandidate {
        merged_at: (state == PrState::Merged).then(|| at(500)),
        state,
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        number,
    }
}

/// Confirmation port answering from a queue (then "no"), recording prompts
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer "yes" to every prompt
    pub fn always_yes(count: usize) -> Self {
        Self::new(&vec![true; count])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ConfirmPrompt for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

/// Progress callback recording every event
#[derive(Default)]
pub struct RecordingProgress {
    stages: Mutex<Vec<(u64, Stage)>>,
    previews: Mutex<Vec<NewPullRequest>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn stages(&self) -> Vec<(u64, Stage)> {
        self.stages.lock().unwrap().clone()
    }

    pub fn stages_for(&self, pr_number: u64) -> Vec<Stage> {
        self.stages()
            .into_iter()
            .filter(|(n, _)| *n == pr_number)
            .map(|(_, s)| s)
            .collect()
    }

    pub fn previews(&self) -> Vec<NewPullRequest> {
        self.previews.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_stage(&self, pr_number: u64, stage: Stage) {
        self.stages.lock().unwrap().push((pr_number, stage));
    }

    async fn on_preview(&self, _pr_number: u64, pr: &NewPullRequest) {
        self.previews.lock().unwrap().push(pr.clone());
    }

    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
