//! # filesync-github
//!
//! Pull-request publishing. [`PullRequestHost`] is the contract the sync
//! pipeline calls; [`GitHubClient`] implements it against the GitHub REST API.
//! An equivalent open pull request is reported as
//! [`PublishResult::AlreadyExists`], which callers treat as success. The host
//! also lists organization repositories for pattern-selected destinations.

pub mod client;
pub mod error;
pub mod host;

pub use client::{is_pull_request_exists, GitHubClient};
pub use error::PublishError;
pub use host::{HostedRepository, PublishResult, PullRequest, PullRequestHost};
