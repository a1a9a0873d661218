//! Backport command - cherry-pick merged PRs onto a release branch

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow, check, link, spinner_style};
use crate::cli::{CliProgress, DialoguerConfirm};
use anstream::{eprintln, print, println};
use backporter::backport::{
    BackportExecutionResult, BackportPlan, BackportStep, ExecuteOptions, PlanOptions, PrSource,
    RunOutcome, create_backport_plan, execute_backport, find_all_backports, fork_owner,
    load_change_requests, sequence,
};
use backporter::config::Config;
use backporter::error::{Error, Result};
use backporter::exec::CommandRunner;
use backporter::platform::PlatformService;
use backporter::reference::parse_pr_references;
use backporter::types::{BackportCandidate, PrState, RepoSlug};
use indicatif::ProgressBar;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;

/// Options for the backport command, after merging flags with config
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackportOptions {
    /// Release branch to backport onto
    pub release_branch: String,
    /// PR references as typed by the user
    pub prs: Vec<String>,
    /// Explicit base repository
    pub repo: Option<RepoSlug>,
    /// Remote holding the release branch
    pub base_remote: String,
    /// Remote to push cherry-pick branches to
    pub push_remote: String,
    /// Prefix for cherry-pick branch names
    pub branch_prefix: String,
    /// Create PRs as drafts
    pub draft: bool,
    /// Skip the clean working tree check
    pub allow_dirty: bool,
    /// Push with `--force-with-lease` without asking
    pub force_push: bool,
    /// Print the plan only
    pub dry_run: bool,
    /// Load PRs from the backport label instead of `prs`
    pub from_label: bool,
}

/// Work out where the PRs come from, rejecting bad input before any I/O
fn resolve_source(options: &BackportOptions, config: &Config) -> Result<PrSource> {
    match (options.from_label, options.prs.is_empty()) {
        (true, false) => Err(Error::ConflictingSources),
        (true, true) => Ok(PrSource::Label {
            label: config.backport_label(&options.release_branch),
            main_branch: config.main_branch.clone(),
        }),
        (false, true) => Err(Error::NoReferences),
        (false, false) => Ok(PrSource::Explicit(parse_pr_references(&options.prs)?)),
    }
}

/// Run the backport command and return the process exit status
#[allow(clippy::too_many_lines)]
pub async fn run_backport(
    runner: Arc<dyn CommandRunner>,
    options: BackportOptions,
    config: &Config,
) -> Result<u8> {
    // =========================================================================
    // Phase 1: GATHER - Collect all data upfront (read-only)
    // =========================================================================

    let source = resolve_source(&options, config)?;
    let ctx = CommandContext::new(runner);
    ctx.ensure_clean_worktree(options.allow_dirty).await?;

    if options.dry_run {
        println!("{}", "--dry-run set; no changes will be made.".warn());
    }

    if let PrSource::Label { ref label, .. } = source {
        println!("{}", format!("Loading PRs labeled {label}...").muted());
    }
    let loader = ctx.platform(options.repo.clone());
    let loaded = sequence(load_change_requests(&loader, &source).await?);

    let repos = ctx
        .resolve_repos(options.repo.as_ref(), &options.base_remote, &options.push_remote)
        .await;
    if repos.base.is_none() && !options.dry_run {
        return Err(Error::UnknownBaseRepo(options.base_remote));
    }

    if !options.dry_run {
        fetch_with_spinner(&ctx, &options.base_remote).await?;
    }

    // =========================================================================
    // Phase 2: DETECT - Look for existing backports (read-only)
    // =========================================================================

    let platform = ctx.platform(repos.base.clone());
    if !loaded.completed.is_empty() {
        println!(
            "{}",
            format!(
                "Checking {} PR(s) for existing backports...",
                loaded.completed.len()
            )
            .muted()
        );
    }
    let backports =
        find_all_backports(&platform, &loaded.completed, &options.release_branch).await?;

    // =========================================================================
    // Phase 3: PLAN - Pure function, easily testable
    // =========================================================================

    let head_owner = repos
        .base
        .as_ref()
        .and_then(|base| fork_owner(base, repos.push.as_ref()));
    let plan = create_backport_plan(
        &loaded.completed,
        &backports,
        loaded.pending,
        &PlanOptions {
            release_branch: options.release_branch.clone(),
            branch_prefix: options.branch_prefix.clone(),
            head_owner,
        },
    );

    match platform.repo() {
        Some(repo) => println!("{} {}", "Base repository:".muted(), repo.to_string().accent()),
        None => println!("{}", "Base repository: gh default".muted()),
    }
    report_plan(&plan);

    // =========================================================================
    // Phase 4: EXECUTE - Effectful operations
    // =========================================================================

    if plan.steps.is_empty() {
        println!("{}", "No merged PRs to backport.".muted());
        return Ok(0);
    }

    if !options.dry_run && !plan.is_empty() {
        println!(
            "{} {}",
            "Backporting".emphasis(),
            format!("{} PR(s) to {}...", plan.pick_count(), plan.release_branch).accent()
        );
    }

    let progress = CliProgress::new(config.preview_lines);
    let result = execute_backport(
        &plan,
        &ctx.git,
        &platform,
        &DialoguerConfirm,
        &progress,
        &ExecuteOptions {
            base_remote: options.base_remote.clone(),
            push_remote: options.push_remote.clone(),
            force_push: options.force_push,
            draft: options.draft,
            dry_run: options.dry_run,
        },
    )
    .await?;

    print_summary(&plan, &result, options.dry_run);
    Ok(result.exit_code())
}

async fn fetch_with_spinner(ctx: &CommandContext, remote: &str) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Fetching from {}...", remote.emphasis()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    if let Err(e) = ctx.git.fetch(remote).await {
        spinner.finish_and_clear();
        return Err(e);
    }

    spinner.finish_with_message(format!("{} Fetched from {}", check(), remote.emphasis()));
    Ok(())
}

fn status_label(state: &PrState) -> String {
    match state {
        PrState::Merged => "*BACKPORTED*".success(),
        PrState::Open => "*IN PROGRESS*".warn(),
        _ => "*NONE*".muted(),
    }
}

fn render_candidates(out: &mut String, candidates: &[BackportCandidate]) -> fmt::Result {
    match candidates.len() {
        0 => writeln!(out, "      backport: {}", "*NONE*".muted())?,
        1 => {}
        n => writeln!(out, "      backport: {}", format!("*MULTIPLE* ({n})").warn())?,
    }
    for candidate in candidates {
        writeln!(
            out,
            "        {} {}",
            status_label(&candidate.state),
            link(&candidate.url)
        )?;
    }
    Ok(())
}

fn render_plan_into(out: &mut String, plan: &BackportPlan) -> fmt::Result {
    writeln!(out, "{}:", "Will process PRs in merged order".emphasis())?;

    if plan.steps.is_empty() {
        writeln!(out, "  {}", "No merged PRs to process".muted())?;
    }

    for (i, step) in plan.steps.iter().enumerate() {
        let change = step.change();
        writeln!(
            out,
            "  {:02}. {} mergedAt={} sha={}",
            i + 1,
            format!("#{}", change.number).accent(),
            change.merged_at.to_rfc3339(),
            change.merge_sha
        )?;
        writeln!(out, "      title: {}", change.title)?;
        render_candidates(out, step.candidates())?;
        match step {
            BackportStep::CherryPick { branch, .. } => {
                writeln!(out, "      {} cherry-pick as {}", arrow(), branch.accent())?;
            }
            BackportStep::Skip { .. } => {
                writeln!(out, "      {} {}", arrow(), step.to_string().muted())?;
            }
        }
    }

    if !plan.pending.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}:", "Pending merge into main".emphasis())?;
        for pending in &plan.pending {
            writeln!(
                out,
                "  #{} ({}): {}",
                pending.number,
                pending.state.to_string().to_lowercase(),
                pending.status().warn()
            )?;
            writeln!(out, "      title: {}", pending.title)?;
            writeln!(out, "      {}", link(&pending.url))?;
        }
    }
    Ok(())
}

/// The processing plan: every PR in merge order, then pending ones
fn render_plan(plan: &BackportPlan) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = render_plan_into(&mut out, plan);
    out
}

fn report_plan(plan: &BackportPlan) {
    println!();
    print!("{}", render_plan(plan));
    println!();
}

fn skip_recap(plan: &BackportPlan, result: &BackportExecutionResult) -> Option<String> {
    if plan.skip_count() == 0 && plan.pending.is_empty() {
        return None;
    }
    Some(format!(
        "Skipped {} PR(s) with existing backports; {} labeled PR(s) not merged into main.",
        result.skipped.len(),
        plan.pending.len()
    ))
}

/// Print how the run ended and which PRs were created
fn print_summary(plan: &BackportPlan, result: &BackportExecutionResult, dry_run: bool) {
    println!();
    if dry_run {
        println!(
            "{}",
            format!(
                "Dry run complete: {} to cherry-pick, {} already backported.",
                plan.pick_count(),
                plan.skip_count()
            )
            .muted()
        );
        return;
    }

    match &result.outcome {
        RunOutcome::Completed => {}
        RunOutcome::UserAborted { pr_number } => {
            println!(
                "{}",
                format!("Aborting by user request at PR #{pr_number}. No further PRs will be created.")
                    .warn()
            );
        }
        RunOutcome::Conflict {
            pr_number,
            branch,
            details,
        } => {
            eprintln!("{details}");
            eprintln!();
            eprintln!(
                "{}",
                format!(
                    "STOPPING: Cherry-pick of PR #{pr_number} failed (likely conflicts). No PR will be created."
                )
                .error()
            );
            eprintln!(
                "Branch {} is left checked out. Resolve manually if you want, then re-run for the remaining PRs.",
                branch.accent()
            );
        }
    }

    if result.is_complete() {
        println!("{} Done.", check());
    }
    if let Some(recap) = skip_recap(plan, result) {
        println!("{}", recap.muted());
    }
    if result.created.is_empty() {
        println!("{}", "No PRs created.".muted());
    } else {
        println!("Created PRs:");
        for created in &result.created {
            println!("  #{}: {}", created.pr_number, link(&created.url));
        }
    }
}
