//! # filesync-git
//!
//! Version-control backend for file-sync.
//!
//! [`GitBackend`] is the contract the sync pipeline drives; [`GitCli`] fulfils
//! it by invoking the `git` binary. [`WorkingCopy`] owns a disposable clone
//! and removes it when dropped.

pub mod backend;
pub mod cli;
pub mod error;
pub mod tolerate;
pub mod working_copy;

pub use backend::GitBackend;
pub use cli::GitCli;
pub use error::{GitError, GitOp};
pub use working_copy::WorkingCopy;
