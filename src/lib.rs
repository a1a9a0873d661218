//! backporter - replay merged pull requests onto release branches
//!
//! Given merged PRs on the main line, backporter cherry-picks each one (in
//! the order they were merged) onto a release branch, skips PRs that already
//! have a backport, and opens one backport PR per cherry-pick after asking
//! the operator.
//!
//! Git and the code-hosting platform are only ever reached through external
//! CLIs (`git`, `gh`), behind the [`exec::CommandRunner`] and
//! [`platform::PlatformService`] ports.

pub mod backport;
pub mod config;
pub mod error;
pub mod exec;
pub mod git;
pub mod platform;
pub mod reference;
pub mod types;

pub use error::{Error, Result};
