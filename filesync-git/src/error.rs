//! Error types for filesync-git.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The backend operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOp {
    Clone,
    Config,
    Fetch,
    Branch,
    Checkout,
    Reset,
    Status,
    Add,
    Commit,
    Push,
}

impl fmt::Display for GitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GitOp::Clone => "clone",
            GitOp::Config => "config",
            GitOp::Fetch => "fetch",
            GitOp::Branch => "branch",
            GitOp::Checkout => "checkout",
            GitOp::Reset => "reset",
            GitOp::Status => "status",
            GitOp::Add => "add",
            GitOp::Commit => "commit",
            GitOp::Push => "push",
        };
        f.write_str(name)
    }
}

/// All errors that can arise from version-control operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` process could not be started at all.
    #[error("failed to run git {op}: {source}")]
    Spawn {
        op: GitOp,
        #[source]
        source: std::io::Error,
    },

    /// git ran and exited non-zero. `detail` is its diagnostic output.
    #[error("git {op} failed: {detail}")]
    Failed { op: GitOp, detail: String },

    /// Filesystem error while allocating a working copy.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    /// The operation this error came from, when it came from git.
    pub fn op(&self) -> Option<GitOp> {
        match self {
            GitError::Spawn { op, .. } | GitError::Failed { op, .. } => Some(*op),
            GitError::Io { .. } => None,
        }
    }

    /// Raw diagnostic text reported by git, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            GitError::Failed { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
