//! `file-sync run`: one full reconciliation per destination repository.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use filesync_core::{BranchName, SyncConfig};
use filesync_git::GitCli;
use filesync_github::{GitHubClient, PublishResult};
use filesync_sync::{
    destinations,
    pipeline::{SyncOutcome, SyncReport},
    CopyResult, DeleteResult, DestinationRun, DestinationSummary,
};

use super::ConfigArgs;

/// Arguments for `file-sync run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Copy and detect changes, but do not commit, push or open a pull request.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit a machine-readable JSON summary.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        let git = GitCli::new();
        let host = GitHubClient::new(config.api_url.clone(), config.token.clone());

        let runs = destinations::run_all(&git, &host, &config, self.dry_run)
            .context("could not resolve destination repositories")?;

        if self.json {
            print_json(&config, &runs, self.dry_run)?;
        } else {
            for run in &runs {
                println!("{}", run.repo.to_string().bold());
                match &run.result {
                    Ok(report) => print_summary(&config.pull_request_branch, report),
                    Err(err) => println!("  {} {err}", "failed".red()),
                }
            }
        }

        let failed = runs.iter().filter(|run| !run.is_ok()).count();
        if failed > 0 {
            bail!("{failed} of {} destination(s) failed", runs.len());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct RunSummaryJson<'a> {
    source: String,
    branch: &'a str,
    dry_run: bool,
    destinations: Vec<DestinationSummary<'a, SyncReport>>,
    finished_at: DateTime<Utc>,
}

fn print_json(
    config: &SyncConfig,
    runs: &[DestinationRun<SyncReport>],
    dry_run: bool,
) -> Result<()> {
    let payload = RunSummaryJson {
        source: config.source_repo.to_string(),
        branch: config.pull_request_branch.as_str(),
        dry_run,
        destinations: runs.iter().map(DestinationSummary::from).collect(),
        finished_at: Utc::now(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize run summary")?
    );
    Ok(())
}

fn print_summary(branch: &BranchName, report: &SyncReport) {
    for copy in &report.copies {
        match copy {
            CopyResult::Copied { mapping } => println!("  {} {mapping}", "copied".green()),
            CopyResult::Unchanged { mapping } => {
                println!("  {} {mapping}", "unchanged".bright_black())
            }
            CopyResult::Failed { mapping, reason } => {
                println!("  {} {mapping} ({reason})", "failed".red())
            }
        }
    }
    for deletion in &report.deletions {
        match deletion {
            DeleteResult::Deleted { path } => println!("  {} {path}", "deleted".green()),
            DeleteResult::Absent { path } => println!("  {} {path}", "absent".bright_black()),
            DeleteResult::Failed { path, reason } => {
                println!("  {} {path} ({reason})", "failed".red())
            }
        }
    }

    match &report.outcome {
        SyncOutcome::UpToDate => println!("  {} all files are up to date", "✓".green().bold()),
        SyncOutcome::DryRun => {
            println!(
                "  [dry-run] {} file(s) would be committed to '{branch}':",
                report.changed.len()
            );
            for path in &report.changed {
                println!("    {path}");
            }
        }
        SyncOutcome::Published { pull_request } => {
            println!(
                "  {} committed {} file(s) to '{branch}'",
                "✓".green().bold(),
                report.changed.len()
            );
            match pull_request {
                PublishResult::Created { number, url } => {
                    println!("  {} opened pull request #{number}: {url}", "✓".green().bold())
                }
                PublishResult::AlreadyExists => println!(
                    "  {} pull request for '{branch}' is already open",
                    "✓".green().bold()
                ),
            }
        }
    }

    let failed = report.copies.iter().filter(|c| c.is_failed()).count();
    if failed > 0 {
        println!(
            "{}",
            format!("  {failed} file(s) could not be copied; see the log above").yellow()
        );
    }
}
