//! External process execution
//!
//! All git and code-hosting traffic goes through a [`CommandRunner`], so the
//! engine can be driven by a scripted fake in tests.

use crate::error::{Error, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Exit status (-1 when terminated by a signal)
    pub status: i32,
}

impl ProcessOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            status: 0,
        }
    }

    /// Failed output with the given status and stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            status,
        }
    }

    /// Whether the process exited with status 0
    pub const fn success(&self) -> bool {
        self.status == 0
    }

    /// Stdout and stderr joined, for matching on tool messages
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Trimmed stdout on success, [`Error::CommandFailed`] otherwise
    pub fn into_checked(self, program: &str, args: &[String]) -> Result<String> {
        if self.success() {
            Ok(self.stdout.trim().to_string())
        } else {
            Err(self.into_error(program, args))
        }
    }

    /// Convert into a [`Error::CommandFailed`] carrying the captured output
    pub fn into_error(self, program: &str, args: &[String]) -> Error {
        Error::CommandFailed {
            command: command_line(program, args),
            status: self.status,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Render a command line for messages, quoting arguments with spaces
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|part| {
            if part.is_empty() || part.contains(char::is_whitespace) || part.contains('"') {
                format!("'{}'", part.replace('\'', r"'\''"))
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Port for running external programs
///
/// Implementations must wait for the process to finish and must not treat
/// a non-zero exit as an error; callers interpret the status.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and capture its output
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput>;
}

/// Runs real processes via `tokio::process` in the current directory
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a runner
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput> {
        let rendered = command_line(program, args);
        debug!(command = %rendered, "running command");

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await.map_err(|source| Error::Spawn {
            command: rendered.clone(),
            source,
        })?;

        let result = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        };
        debug!(command = %rendered, status = result.status, "command finished");
        Ok(result)
    }
}
