//! CLI command implementations

pub mod backport;
pub mod context;
pub mod style;

use anstream::println;
use async_trait::async_trait;
use backporter::backport::{ConfirmPrompt, ProgressCallback, Stage};
use backporter::error::{Error, Result};
use backporter::types::NewPullRequest;
use dialoguer::Confirm;
use style::{Stylize, arrow, check};

/// Progress callback that prints pipeline stages to the terminal
pub struct CliProgress {
    preview_lines: usize,
}

impl CliProgress {
    /// Create a progress printer showing `preview_lines` of each PR body
    pub const fn new(preview_lines: usize) -> Self {
        Self { preview_lines }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_stage(&self, pr_number: u64, stage: Stage) {
        match stage {
            Stage::BranchCreated => {
                println!();
                println!(
                    "{} {}",
                    "==>".emphasis(),
                    format!("PR #{pr_number}").accent()
                );
                println!("  {} {stage}", arrow());
            }
            Stage::Created => println!("  {} {stage}", check()),
            Stage::AwaitingConfirmation => {}
            _ => println!("  {} {stage}", arrow()),
        }
    }

    async fn on_preview(&self, _pr_number: u64, pr: &NewPullRequest) {
        let (lines, truncated) = pr.body_preview(self.preview_lines);
        println!();
        println!("{}", "Ready to create PR:".emphasis());
        println!("  Base:  {}", pr.base.accent());
        println!("  Head:  {}", pr.head.accent());
        println!("  Title: {}", pr.title);
        if pr.draft {
            println!("  Draft: yes");
        }
        println!("  Body (first ~{} lines):", self.preview_lines);
        println!("  {}", "-".repeat(40).muted());
        for line in lines {
            println!("  {line}");
        }
        if truncated {
            println!("  {}", "...".muted());
        }
        println!("  {}", "-".repeat(40).muted());
    }

    async fn on_message(&self, message: &str) {
        println!("{} {message}", arrow());
    }
}

/// Yes/no prompt on the terminal, defaulting to "no"
pub struct DialoguerConfirm;

impl ConfirmPrompt for DialoguerConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_error)
    }
}

fn prompt_error(err: dialoguer::Error) -> Error {
    Error::Prompt(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_error_message_prefixed_once() {
        let err = prompt_error(dialoguer::Error::IO(std::io::Error::other("tty closed")));
        let message = err.to_string();
        assert_eq!(message.matches("failed to read confirmation").count(), 1);
        assert!(message.ends_with("tty closed"));
    }
}
