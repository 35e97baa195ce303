//! `file-sync diff`: show unified diffs for what a run would change.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use filesync_git::GitCli;
use filesync_github::GitHubClient;
use filesync_sync::destinations;

use super::ConfigArgs;

/// Arguments for `file-sync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.load()?;
        let host = GitHubClient::new(config.api_url.clone(), config.token.clone());

        let runs = destinations::diff_all(&GitCli::new(), &host, &config)
            .context("could not resolve destination repositories")?;

        let mut failed = 0;
        for run in &runs {
            let diffs = match &run.result {
                Ok(diffs) => diffs,
                Err(err) => {
                    failed += 1;
                    eprintln!("{} diff failed for {}: {err}", "error:".red(), run.repo);
                    continue;
                }
            };
            if diffs.is_empty() {
                println!("No differences for {}.", run.repo);
                continue;
            }
            println!("{}", format!("# {}", run.repo).bold());
            for diff in diffs {
                print!("{}", diff.unified_diff);
                if !diff.unified_diff.ends_with('\n') {
                    println!();
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} destination(s) failed", runs.len());
        }
        Ok(())
    }
}
