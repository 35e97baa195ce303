//! The linear sync run shared by `file-sync run` and `file-sync diff`.
//!
//! clone source → clone destination → prepare branch → copy → detect →
//! (stop if unchanged) → stage → commit → push → publish.
//!
//! Working copies are dropped, and therefore deleted, on every return path.

use std::path::PathBuf;

use serde::Serialize;

use filesync_core::{
    BranchName, FileMapping, Identity, PullRequestOptions, RepoSlug, SyncConfig,
};
use filesync_git::{GitBackend, WorkingCopy};
use filesync_github::{PublishResult, PullRequest, PullRequestHost};

use crate::copier::{copy_all, delete_all, CopyResult, DeleteResult};
use crate::detect::{any_modified, changed_paths};
use crate::diff::{diff_files, FileDiff};
use crate::error::{at_stage, ErrorKind, SyncError};

/// Everything a run needs, resolved up front. The pipeline reads nothing
/// from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Parent directory for the temporary working copies.
    pub workspace: PathBuf,
    pub source_url: String,
    /// Human-readable name of the source, used in the pull request body.
    pub source_label: String,
    pub source_branch: Option<BranchName>,
    pub destination_url: String,
    pub destination_repo: RepoSlug,
    pub target_branch: BranchName,
    pub pull_request_branch: BranchName,
    pub identity: Identity,
    pub commit_message: String,
    pub files: Vec<FileMapping>,
    pub delete_files: Vec<String>,
    pub pull_request: PullRequestOptions,
}

impl SyncPlan {
    /// The plan for syncing into `destination`.
    pub fn from_config(config: &SyncConfig, destination: &RepoSlug) -> Self {
        Self {
            workspace: config.workspace.clone(),
            source_url: config.source_url(),
            source_label: config.source_repo.to_string(),
            source_branch: config.source_branch.clone(),
            destination_url: config.destination_url(destination),
            destination_repo: destination.clone(),
            target_branch: config.target_branch.clone(),
            pull_request_branch: config.pull_request_branch.clone(),
            identity: config.identity.clone(),
            commit_message: config.commit_message.clone(),
            files: config.files.clone(),
            delete_files: config.delete_files.clone(),
            pull_request: config.pull_request.clone(),
        }
    }

    /// Destination paths subject to change detection: every mapping's
    /// destination followed by every deletion, in configuration order.
    pub fn tracked_paths(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|m| m.destination.as_str())
            .chain(self.delete_files.iter().map(String::as_str))
            .collect()
    }

    fn pull_request_for(&self, changed: &[String]) -> PullRequest {
        let body = self
            .pull_request
            .body
            .clone()
            .unwrap_or_else(|| render_body(&self.source_label, changed));
        PullRequest {
            title: self.pull_request.title.clone(),
            body,
            head: self.pull_request_branch.to_string(),
            base: self.target_branch.to_string(),
            draft: self.pull_request.draft,
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No tracked path changed; nothing was committed, pushed or published.
    UpToDate,
    /// Changes were found but `dry_run` stopped the run before staging.
    DryRun,
    Published { pull_request: PublishResult },
}

/// Outcome of a run plus per-file diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub copies: Vec<CopyResult>,
    pub deletions: Vec<DeleteResult>,
    /// Tracked paths that differed from the sync branch tip.
    pub changed: Vec<String>,
    pub outcome: SyncOutcome,
}

struct Prepared {
    source: WorkingCopy,
    destination: WorkingCopy,
}

fn prepare<G>(git: &G, plan: &SyncPlan) -> Result<Prepared, SyncError>
where
    G: GitBackend + ?Sized,
{
    let mut source = WorkingCopy::clone_into(git, &plan.source_url, &plan.workspace)
        .map_err(at_stage(ErrorKind::CloneFailed))?;
    if let Some(branch) = &plan.source_branch {
        source
            .checkout(git, branch)
            .map_err(at_stage(ErrorKind::BranchPrepareFailed))?;
    }

    let mut destination = WorkingCopy::clone_into(git, &plan.destination_url, &plan.workspace)
        .map_err(at_stage(ErrorKind::CloneFailed))?;
    destination
        .set_identity(git, &plan.identity)
        .map_err(at_stage(ErrorKind::ConfigFailed))?;
    destination
        .prepare_branch(git, &plan.pull_request_branch, &plan.target_branch)
        .map_err(at_stage(ErrorKind::BranchPrepareFailed))?;

    Ok(Prepared {
        source,
        destination,
    })
}

/// Run one reconciliation.
///
/// With `dry_run` the run stops after change detection; nothing is staged,
/// committed, pushed or published.
pub fn run<G, H>(git: &G, host: &H, plan: &SyncPlan, dry_run: bool) -> Result<SyncReport, SyncError>
where
    G: GitBackend + ?Sized,
    H: PullRequestHost + ?Sized,
{
    tracing::info!(
        "syncing {} file(s) from {} into {} ({})",
        plan.files.len(),
        plan.source_label,
        plan.destination_repo,
        plan.pull_request_branch
    );
    let Prepared {
        source,
        destination,
    } = prepare(git, plan)?;

    let copies = copy_all(&plan.files, source.root(), destination.root());
    let deletions = delete_all(&plan.delete_files, destination.root());
    drop(source);

    let tracked = plan.tracked_paths();
    if !any_modified(git, destination.root(), &tracked) {
        tracing::info!("all files are up to date");
        return Ok(SyncReport {
            copies,
            deletions,
            changed: Vec::new(),
            outcome: SyncOutcome::UpToDate,
        });
    }
    let changed = changed_paths(git, destination.root(), &tracked);

    if dry_run {
        tracing::info!("[dry-run] {} file(s) would be committed", changed.len());
        return Ok(SyncReport {
            copies,
            deletions,
            changed,
            outcome: SyncOutcome::DryRun,
        });
    }

    stage(git, &destination, plan, &deletions)?;
    tracing::info!("committing {} changed file(s)", changed.len());
    git.commit(destination.root(), &plan.commit_message)
        .map_err(at_stage(ErrorKind::CommitFailed))?;
    git.push(destination.root(), plan.pull_request_branch.as_str())
        .map_err(at_stage(ErrorKind::PushFailed))?;

    let request = plan.pull_request_for(&changed);
    let pull_request = host.create_pull_request(&plan.destination_repo, &request)?;

    Ok(SyncReport {
        copies,
        deletions,
        changed,
        outcome: SyncOutcome::Published { pull_request },
    })
}

/// Stage each tracked path individually. Paths with nothing on disk (a
/// failed copy of a file the destination never had) are skipped; a failure
/// on any staged path aborts the run.
fn stage<G>(
    git: &G,
    destination: &WorkingCopy,
    plan: &SyncPlan,
    deletions: &[DeleteResult],
) -> Result<(), SyncError>
where
    G: GitBackend + ?Sized,
{
    let deleted: Vec<&str> = deletions
        .iter()
        .filter(|d| matches!(d, DeleteResult::Deleted { .. }))
        .map(DeleteResult::path)
        .collect();

    let mut staged: Vec<&str> = Vec::new();
    for path in plan.files.iter().map(|m| m.destination.as_str()) {
        if staged.contains(&path) {
            continue;
        }
        if !destination.root().join(path).exists() {
            tracing::warn!("nothing to stage for {path}");
            continue;
        }
        git.add(destination.root(), path)
            .map_err(at_stage(ErrorKind::StageFailed))?;
        staged.push(path);
    }
    for path in deleted {
        if staged.contains(&path) {
            continue;
        }
        git.add(destination.root(), path)
            .map_err(at_stage(ErrorKind::StageFailed))?;
        staged.push(path);
    }
    Ok(())
}

/// Prepare both working copies and diff the file set without writing.
pub fn diff<G>(git: &G, plan: &SyncPlan) -> Result<Vec<FileDiff>, SyncError>
where
    G: GitBackend + ?Sized,
{
    let Prepared {
        source,
        destination,
    } = prepare(git, plan)?;
    Ok(diff_files(
        &plan.files,
        &plan.delete_files,
        source.root(),
        destination.root(),
    ))
}

fn render_body(source_label: &str, changed: &[String]) -> String {
    let mut body = format!("Synchronized files from `{source_label}`.\n\n");
    for path in changed {
        body.push_str(&format!("- `{path}`\n"));
    }
    body
}
