//! Configuration file support
//!
//! Settings live in `<config dir>/backporter/config.toml`. Every key is
//! optional; command-line flags override whatever the file says.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name for backporter settings within the user config dir.
const CONFIG_DIR: &str = "backporter";

/// Filename for settings.
const CONFIG_FILE: &str = "config.toml";

/// User settings with built-in defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Remote holding the release branch
    pub base_remote: String,
    /// Remote that cherry-pick branches are pushed to
    pub push_remote: String,
    /// Prefix for cherry-pick branch names
    pub branch_prefix: String,
    /// Main line branch that labeled PRs target
    pub main_branch: String,
    /// Prefix of the label that marks PRs for backporting
    pub label_prefix: String,
    /// Prefix stripped from the release branch to form the label suffix
    pub release_prefix: String,
    /// Create PRs as drafts
    pub draft: bool,
    /// Body lines shown in the pre-creation preview
    pub preview_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_remote: "upstream".to_string(),
            push_remote: "origin".to_string(),
            branch_prefix: "cherrypick".to_string(),
            main_branch: "main".to_string(),
            label_prefix: "backport_".to_string(),
            release_prefix: "release/".to_string(),
            draft: false,
            preview_lines: 20,
        }
    }
}

impl Config {
    /// Label marking main-line PRs destined for `release_branch`
    ///
    /// `release/1.7.2511` becomes `backport_1.7.2511` with default settings.
    pub fn backport_label(&self, release_branch: &str) -> String {
        let release_name = release_branch
            .strip_prefix(&self.release_prefix)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(release_branch);
        format!("{}{release_name}", self.label_prefix)
    }
}

/// Default location of the settings file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load settings from `path`.
///
/// Returns defaults if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Load settings from an explicit path, or the default location.
///
/// An explicit path must exist; the default location is optional.
pub fn load_config_from(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) if !path.exists() => Err(Error::Config(format!(
            "config file {} does not exist",
            path.display()
        ))),
        Some(path) => load_config(path),
        None => default_config_path().map_or_else(|| Ok(Config::default()), |p| load_config(&p)),
    }
}
