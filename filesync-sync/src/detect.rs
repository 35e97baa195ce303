//! Change detection over the tracked destination paths.
//!
//! A path is changed when git's short status for exactly that path is
//! non-empty (untracked, modified, or deleted relative to `HEAD`). A status
//! query that fails is logged and counted as unchanged, so a backend hiccup
//! can at worst delay a sync by one run.

use std::path::Path;

use filesync_git::GitBackend;

fn is_changed<G>(git: &G, repo: &Path, path: &str) -> bool
where
    G: GitBackend + ?Sized,
{
    match git.status_short(repo, path) {
        Ok(status) => {
            let changed = !status.trim().is_empty();
            if changed {
                tracing::debug!("changed: {}", status.trim());
            }
            changed
        }
        Err(e) => {
            tracing::error!("status check failed for {path}: {e}");
            false
        }
    }
}

/// True as soon as one tracked path has changed.
pub fn any_modified<G, S>(git: &G, repo: &Path, paths: &[S]) -> bool
where
    G: GitBackend + ?Sized,
    S: AsRef<str>,
{
    paths.iter().any(|p| is_changed(git, repo, p.as_ref()))
}

/// Every tracked path that has changed, in input order, without duplicates.
pub fn changed_paths<G, S>(git: &G, repo: &Path, paths: &[S]) -> Vec<String>
where
    G: GitBackend + ?Sized,
    S: AsRef<str>,
{
    let mut changed: Vec<String> = Vec::new();
    for path in paths.iter().map(AsRef::as_ref) {
        if !changed.iter().any(|c| c == path) && is_changed(git, repo, path) {
            changed.push(path.to_string());
        }
    }
    changed
}
