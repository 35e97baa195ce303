//! file-sync core library: domain types, file-list parsing, configuration.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain structs
//! - [`files`]: the `source[=destination]` file-list resolver
//! - [`config`]: environment-derived [`SyncConfig`]
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod files;
pub mod types;

pub use config::{DestinationSet, SyncConfig, DEFAULT_API_URL, DEFAULT_SERVER_URL};
pub use error::ConfigError;
pub use files::{parse_file_list, parse_path_list};
pub use types::{
    redact_url, BranchName, FileMapping, Identity, PullRequestOptions, RepoPattern, RepoSlug,
};
