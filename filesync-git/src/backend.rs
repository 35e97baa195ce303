//! The version-control contract driven by the sync pipeline.

use std::path::Path;

use crate::error::GitError;

/// Operations the sync pipeline needs from a version-control backend.
///
/// Every call blocks until the underlying operation finishes. `repo` is
/// always the root of a working copy.
pub trait GitBackend {
    /// Clone `url` into the existing, empty directory `dest`.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Set a repository-local config value.
    fn set_config(&self, repo: &Path, key: &str, value: &str) -> Result<(), GitError>;

    fn fetch(&self, repo: &Path) -> Result<(), GitError>;

    /// Create a local branch at `start_point`. Succeeds if it already exists.
    fn branch(&self, repo: &Path, name: &str, start_point: &str) -> Result<(), GitError>;

    fn checkout(&self, repo: &Path, name: &str) -> Result<(), GitError>;

    /// Hard-reset the current branch to `remote_ref`. Succeeds without
    /// changes if the ref does not exist.
    fn reset_hard(&self, repo: &Path, remote_ref: &str) -> Result<(), GitError>;

    /// Machine-readable short status for exactly `path`. Empty when clean.
    fn status_short(&self, repo: &Path, path: &str) -> Result<String, GitError>;

    fn add(&self, repo: &Path, path: &str) -> Result<(), GitError>;

    /// Commit the index using the repository-local identity.
    fn commit(&self, repo: &Path, message: &str) -> Result<(), GitError>;

    /// Push `branch` to `origin`, setting it as upstream.
    fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError>;
}
