//! # filesync-sync
//!
//! Reconciliation of a destination repository against a source repository.
//!
//! [`pipeline::run`] drives one run end to end: clone both repositories,
//! prepare the sync branch, copy the file set, detect changes, and only when
//! something changed commit, push and open a pull request.
//! [`destinations::run_all`] repeats that run for every destination
//! repository of a configuration.

pub mod copier;
pub mod destinations;
pub mod detect;
pub mod diff;
pub mod error;
pub mod pipeline;

pub use copier::{copy_all, delete_all, CopyResult, DeleteResult};
pub use destinations::{resolve, DestinationRun, DestinationSummary};
pub use detect::{any_modified, changed_paths};
pub use diff::{diff_files, FileDiff};
pub use error::{ErrorKind, SyncError};
pub use pipeline::{SyncOutcome, SyncPlan, SyncReport};
