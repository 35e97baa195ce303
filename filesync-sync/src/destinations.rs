//! One configuration, many destination repositories.
//!
//! Destinations are resolved once up front, then each one gets its own
//! independent [`pipeline::run`]. A failing destination is reported and the
//! remaining ones still run.

use std::collections::BTreeSet;

use serde::Serialize;

use filesync_core::{DestinationSet, RepoSlug, SyncConfig};
use filesync_git::GitBackend;
use filesync_github::PullRequestHost;

use crate::diff::FileDiff;
use crate::error::SyncError;
use crate::pipeline::{self, SyncPlan, SyncReport};

/// The result of one operation against one destination.
#[derive(Debug)]
pub struct DestinationRun<T> {
    pub repo: RepoSlug,
    pub result: Result<T, SyncError>,
}

impl<T> DestinationRun<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serialized form of a [`DestinationRun`] for machine-readable output.
#[derive(Debug, Serialize)]
pub struct DestinationSummary<'a, T: Serialize> {
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a, T: Serialize> From<&'a DestinationRun<T>> for DestinationSummary<'a, T> {
    fn from(run: &'a DestinationRun<T>) -> Self {
        Self {
            repository: run.repo.to_string(),
            report: run.result.as_ref().ok(),
            error: run.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Final, sorted destination list: explicit repositories plus every
/// unarchived repository matching a pattern, minus the exclusions.
///
/// The host is only asked for listings when patterns are configured.
pub fn resolve<H>(host: &H, set: &DestinationSet) -> Result<Vec<RepoSlug>, SyncError>
where
    H: PullRequestHost + ?Sized,
{
    let owners: BTreeSet<&str> = set.patterns.iter().map(|p| p.owner.as_str()).collect();
    let mut listed = Vec::new();
    for owner in owners {
        for repo in host.list_repositories(owner).map_err(SyncError::Discovery)? {
            if repo.archived {
                tracing::debug!("skipping archived repository {}", repo.slug);
                continue;
            }
            listed.push(repo.slug);
        }
    }

    let selected = set.select(set.matching(&listed));
    if selected.is_empty() {
        tracing::warn!("no destination repositories selected");
    }
    for repo in &selected {
        tracing::info!("destination: {repo}");
    }
    Ok(selected)
}

/// Sync every destination of `config`. Fails only when the destination list
/// itself cannot be resolved.
pub fn run_all<G, H>(
    git: &G,
    host: &H,
    config: &SyncConfig,
    dry_run: bool,
) -> Result<Vec<DestinationRun<SyncReport>>, SyncError>
where
    G: GitBackend + ?Sized,
    H: PullRequestHost + ?Sized,
{
    let repos = resolve(host, &config.destinations)?;
    Ok(for_each(config, repos, |plan| {
        pipeline::run(git, host, plan, dry_run)
    }))
}

/// Diff every destination of `config` without writing to any of them.
pub fn diff_all<G, H>(
    git: &G,
    host: &H,
    config: &SyncConfig,
) -> Result<Vec<DestinationRun<Vec<FileDiff>>>, SyncError>
where
    G: GitBackend + ?Sized,
    H: PullRequestHost + ?Sized,
{
    let repos = resolve(host, &config.destinations)?;
    Ok(for_each(config, repos, |plan| pipeline::diff(git, plan)))
}

fn for_each<T>(
    config: &SyncConfig,
    repos: Vec<RepoSlug>,
    mut op: impl FnMut(&SyncPlan) -> Result<T, SyncError>,
) -> Vec<DestinationRun<T>> {
    repos
        .into_iter()
        .map(|repo| {
            let plan = SyncPlan::from_config(config, &repo);
            let result = op(&plan);
            if let Err(err) = &result {
                tracing::error!("{repo}: {err}");
            }
            DestinationRun { repo, result }
        })
        .collect()
}
