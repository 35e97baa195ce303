//! Disposable local clones.
//!
//! A [`WorkingCopy`] is created by cloning into a fresh temporary directory
//! and is removed recursively when dropped, on every exit path. Removal
//! failures are logged, never propagated.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use filesync_core::{redact_url, BranchName, Identity};

use crate::backend::GitBackend;
use crate::error::{io_err, GitError};

const TEMP_PREFIX: &str = "file-sync-repo-";

/// A local clone owned by the current run.
#[derive(Debug)]
pub struct WorkingCopy {
    dir: Option<TempDir>,
    root: PathBuf,
    remote: String,
    branch: Option<BranchName>,
}

impl WorkingCopy {
    /// Allocate an empty directory under `parent` and clone `url` into it.
    ///
    /// On failure the directory is removed before the error is returned.
    pub fn clone_into<G>(git: &G, url: &str, parent: &Path) -> Result<Self, GitError>
    where
        G: GitBackend + ?Sized,
    {
        let remote = redact_url(url);
        tracing::info!("cloning repository: {remote}");

        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        let dir = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| io_err(parent, e))?;

        let copy = Self {
            root: dir.path().to_path_buf(),
            dir: Some(dir),
            remote,
            branch: None,
        };
        // `copy` is dropped (and its directory removed) if the clone fails.
        git.clone_repo(url, copy.root())?;
        Ok(copy)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remote URL with credentials redacted.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Branch checked out by [`Self::checkout`] or [`Self::prepare_branch`].
    pub fn branch(&self) -> Option<&BranchName> {
        self.branch.as_ref()
    }

    /// Set the commit identity for this clone only.
    pub fn set_identity<G>(&self, git: &G, identity: &Identity) -> Result<(), GitError>
    where
        G: GitBackend + ?Sized,
    {
        git.set_config(&self.root, "user.name", &identity.name)?;
        git.set_config(&self.root, "user.email", &identity.email)
    }

    /// Check out an existing branch.
    pub fn checkout<G>(&mut self, git: &G, branch: &BranchName) -> Result<(), GitError>
    where
        G: GitBackend + ?Sized,
    {
        git.checkout(&self.root, branch.as_str())?;
        self.branch = Some(branch.clone());
        Ok(())
    }

    /// Put `branch` at the last published state of `origin/<branch>`.
    ///
    /// Fetches, creates the branch from `origin/<base>` if absent, checks it
    /// out, then hard-resets to the remote tip. A branch that was never
    /// pushed stays at the tip of `base`.
    pub fn prepare_branch<G>(
        &mut self,
        git: &G,
        branch: &BranchName,
        base: &BranchName,
    ) -> Result<(), GitError>
    where
        G: GitBackend + ?Sized,
    {
        tracing::info!("preparing branch {branch} from {base}");
        git.fetch(&self.root)?;
        git.branch(&self.root, branch.as_str(), &base.remote_ref())?;
        self.checkout(git, branch)?;
        git.reset_hard(&self.root, &branch.remote_ref())
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else { return };
        tracing::debug!("removing working copy {}", self.root.display());
        if let Err(e) = dir.close() {
            tracing::error!("failed to remove {}: {e}", self.root.display());
        }
    }
}
