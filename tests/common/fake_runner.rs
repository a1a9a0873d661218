//! Scripted command runner for testing
//!
//! Replies to commands by prefix match; unmatched commands succeed with
//! empty output. Every invocation is recorded.

#![allow(dead_code)]

use async_trait::async_trait;
use backporter::error::Result;
use backporter::exec::{CommandRunner, ProcessOutput};
use std::sync::Mutex;

struct Rule {
    prefix: Vec<String>,
    output: ProcessOutput,
    once: bool,
}

/// Command runner driven by prefix rules
#[derive(Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `output` to every command starting with `prefix`
    pub fn on(&self, prefix: &[&str], output: ProcessOutput) {
        self.push_rule(prefix, output, false);
    }

    /// Reply with `output` to the next command starting with `prefix` only
    pub fn once(&self, prefix: &[&str], output: ProcessOutput) {
        self.push_rule(prefix, output, true);
    }

    fn push_rule(&self, prefix: &[&str], output: ProcessOutput, once: bool) {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(ToString::to_string).collect(),
            output,
            once,
        });
    }

    /// Every command run, as `[program, args...]`
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands whose first words are `prefix`
    pub fn calls_starting_with(&self, prefix: &[&str]) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| starts_with(c, prefix))
            .collect()
    }

    /// Number of commands whose first words are `prefix`
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls_starting_with(prefix).len()
    }
}

fn starts_with<S: AsRef<str>>(command: &[String], prefix: &[S]) -> bool {
    command.len() >= prefix.len()
        && command
            .iter()
            .zip(prefix)
            .all(|(a, b)| a.as_str() == b.as_ref())
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput> {
        let command: Vec<String> = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect();
        self.calls.lock().unwrap().push(command.clone());

        let mut rules = self.rules.lock().unwrap();
        // Once-only rules take priority so they can override a standing rule
        let position = rules
            .iter()
            .position(|r| r.once && starts_with(&command, &r.prefix))
            .or_else(|| rules.iter().position(|r| starts_with(&command, &r.prefix)));

        Ok(match position {
            Some(i) if rules[i].once => rules.remove(i).output,
            Some(i) => rules[i].output.clone(),
            None => ProcessOutput::ok(""),
        })
    }
}
