//! backport - cherry-pick merged PRs onto a release branch and open backport PRs

mod cli;

use backporter::config::{Config, load_config_from};
use backporter::error::Result;
use backporter::exec::SystemRunner;
use backporter::types::RepoSlug;
use clap::Parser;
use cli::backport::{BackportOptions, run_backport};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "backport",
    version,
    about = "Cherry-pick merged PRs onto a release branch and open backport PRs",
    after_help = "Exit status: 0 on success or operator abort, 1 on error, 2 when a cherry-pick conflicts."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Release branch to backport onto (e.g. release/1.7.2511)
    release_branch: String,

    /// PR numbers or URLs (e.g. 123, #123, https://github.com/o/r/pull/123)
    #[arg(conflicts_with = "from_backport_label")]
    prs: Vec<String>,

    /// Base repository as OWNER/REPO or HOST/OWNER/REPO
    #[arg(short = 'R', long)]
    repo: Option<RepoSlug>,

    /// Remote that holds the release branch
    #[arg(long)]
    base_remote: Option<String>,

    /// Remote to push cherry-pick branches to
    #[arg(long)]
    push_remote: Option<String>,

    /// Prefix for cherry-pick branch names
    #[arg(long)]
    branch_prefix: Option<String>,

    /// Create backport PRs as drafts
    #[arg(long)]
    draft: bool,

    /// Allow running with uncommitted changes
    #[arg(long)]
    allow_dirty: bool,

    /// Push with --force-with-lease without asking
    #[arg(long)]
    force_push: bool,

    /// Print the plan without touching git or creating PRs
    #[arg(long)]
    dry_run: bool,

    /// Backport every PR labeled for the release instead of listing PRs
    #[arg(long)]
    from_backport_label: bool,

    /// Path to a config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self, config: &Config) -> BackportOptions {
        BackportOptions {
            release_branch: self.release_branch,
            prs: self.prs,
            repo: self.repo,
            base_remote: self.base_remote.unwrap_or_else(|| config.base_remote.clone()),
            push_remote: self.push_remote.unwrap_or_else(|| config.push_remote.clone()),
            branch_prefix: self
                .branch_prefix
                .unwrap_or_else(|| config.branch_prefix.clone()),
            draft: self.draft || config.draft,
            allow_dirty: self.allow_dirty,
            force_push: self.force_push,
            dry_run: self.dry_run,
            from_label: self.from_backport_label,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("backporter=debug,backport=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = load_config_from(cli.config.as_deref())?;
    let options = cli.into_options(&config);
    run_backport(Arc::new(SystemRunner::new()), options, &config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            anstream::eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
