//! The code-hosting contract driven by the sync pipeline.

use serde::Serialize;

use filesync_core::RepoSlug;

use crate::error::PublishError;

/// A request to merge `head` into `base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

/// Successful outcome of a publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PublishResult {
    Created { number: u64, url: String },
    /// An open pull request for the same head and base already exists.
    AlreadyExists,
}

/// A repository as listed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedRepository {
    pub slug: RepoSlug,
    pub archived: bool,
}

/// Something that can open pull requests.
pub trait PullRequestHost {
    fn create_pull_request(
        &self,
        repo: &RepoSlug,
        request: &PullRequest,
    ) -> Result<PublishResult, PublishError>;

    /// Every repository owned by the organization `owner`.
    fn list_repositories(&self, owner: &str) -> Result<Vec<HostedRepository>, PublishError>;
}
