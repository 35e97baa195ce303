//! Error types for filesync-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use filesync_core::ConfigError;
use filesync_git::GitError;
use filesync_github::PublishError;

/// Failure categories of a run. Every kind except [`ErrorKind::CopyFailed`]
/// aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigMissing,
    DiscoveryFailed,
    CloneFailed,
    ConfigFailed,
    BranchPrepareFailed,
    CopyFailed,
    StageFailed,
    CommitFailed,
    PushFailed,
    PublishFailed,
}

impl ErrorKind {
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorKind::CopyFailed)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::ConfigMissing => "configuration missing",
            ErrorKind::DiscoveryFailed => "listing destination repositories failed",
            ErrorKind::CloneFailed => "clone failed",
            ErrorKind::ConfigFailed => "setting commit identity failed",
            ErrorKind::BranchPrepareFailed => "branch preparation failed",
            ErrorKind::CopyFailed => "copy failed",
            ErrorKind::StageFailed => "staging failed",
            ErrorKind::CommitFailed => "commit failed",
            ErrorKind::PushFailed => "push failed",
            ErrorKind::PublishFailed => "publishing pull request failed",
        };
        f.write_str(text)
    }
}

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A version-control step failed. `kind` names the run stage.
    #[error("{kind}: {source}")]
    Git {
        kind: ErrorKind,
        #[source]
        source: GitError,
    },

    /// Pattern destinations could not be listed from the hosting service.
    #[error("listing destination repositories failed: {0}")]
    Discovery(#[source] PublishError),

    /// The hosting service refused or could not be reached.
    #[error("publishing pull request failed: {0}")]
    Publish(#[from] PublishError),

    /// A single file could not be copied or deleted. It becomes the `reason`
    /// of a [`crate::CopyResult::Failed`] or [`crate::DeleteResult::Failed`]
    /// entry and is never returned from a run.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Config(_) => ErrorKind::ConfigMissing,
            SyncError::Git { kind, .. } => *kind,
            SyncError::Discovery(_) => ErrorKind::DiscoveryFailed,
            SyncError::Publish(_) => ErrorKind::PublishFailed,
            SyncError::Io { .. } => ErrorKind::CopyFailed,
        }
    }

    /// The backend's raw diagnostic text, when the failure came from git.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SyncError::Git { source, .. } => source.detail(),
            _ => None,
        }
    }
}

/// Tag a git failure with the run stage it happened in.
pub(crate) fn at_stage(kind: ErrorKind) -> impl FnOnce(GitError) -> SyncError {
    move |source| SyncError::Git { kind, source }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
