//! GitHub REST implementation of [`PullRequestHost`].

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use filesync_core::RepoSlug;

use crate::error::PublishError;
use crate::host::{HostedRepository, PublishResult, PullRequest, PullRequestHost};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("file-sync/", env!("CARGO_PKG_VERSION"));

/// Blocking GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    api_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct CreatedPull {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct ListedRepository {
    name: String,
    #[serde(default)]
    archived: bool,
}

#[derive(Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    message: Option<String>,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl GitHubClient {
    /// `api_url` is the API root, e.g. `https://api.github.com`.
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            agent,
        }
    }

    fn pulls_url(&self, repo: &RepoSlug) -> String {
        format!("{}/repos/{}/{}/pulls", self.api_url, repo.owner, repo.name)
    }

    fn org_repos_url(&self, owner: &str) -> String {
        format!("{}/orgs/{owner}/repos", self.api_url)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let call = self
            .agent
            .request(method, url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
            .set("User-Agent", USER_AGENT);
        match &self.token {
            Some(token) => call.set("Authorization", &format!("Bearer {token}")),
            None => call,
        }
    }
}

impl PullRequestHost for GitHubClient {
    fn create_pull_request(
        &self,
        repo: &RepoSlug,
        request: &PullRequest,
    ) -> Result<PublishResult, PublishError> {
        let url = self.pulls_url(repo);
        tracing::info!(
            "creating pull request {} -> {} on {repo}",
            request.head,
            request.base
        );

        match self.request("POST", &url).send_json(request) {
            Ok(response) => {
                let created: CreatedPull = response.into_json()?;
                tracing::info!("created pull request: {}", created.html_url);
                Ok(PublishResult::Created {
                    number: created.number,
                    url: created.html_url,
                })
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                classify_failure(status, &body)
            }
            Err(ureq::Error::Transport(transport)) => Err(PublishError::Transport {
                url,
                detail: transport.to_string(),
            }),
        }
    }

    fn list_repositories(&self, owner: &str) -> Result<Vec<HostedRepository>, PublishError> {
        let url = self.org_repos_url(owner);
        let mut repositories = Vec::new();
        for page in 1.. {
            tracing::debug!("listing repositories of {owner} (page {page})");
            let response = self
                .request("GET", &url)
                .query("per_page", &PER_PAGE.to_string())
                .query("page", &page.to_string())
                .call();
            let listed: Vec<ListedRepository> = match response {
                Ok(response) => response.into_json()?,
                Err(ureq::Error::Status(status, response)) => {
                    let body = response.into_string().unwrap_or_default();
                    return Err(rejection(status, &body));
                }
                Err(ureq::Error::Transport(transport)) => {
                    return Err(PublishError::Transport {
                        url,
                        detail: transport.to_string(),
                    })
                }
            };
            let last_page = listed.len() < PER_PAGE;
            repositories.extend(listed.into_iter().map(|repo| HostedRepository {
                slug: RepoSlug::new(owner, repo.name),
                archived: repo.archived,
            }));
            if last_page {
                break;
            }
        }
        tracing::info!("found {} repositories in {owner}", repositories.len());
        Ok(repositories)
    }
}

/// GitHub's validation message when an open pull request already covers the
/// same head and base.
pub fn is_pull_request_exists(body: &str) -> bool {
    body.contains("A pull request already exists")
}

fn classify_failure(status: u16, body: &str) -> Result<PublishResult, PublishError> {
    if status == 422 && is_pull_request_exists(body) {
        tracing::info!("pull request already exists");
        return Ok(PublishResult::AlreadyExists);
    }
    Err(rejection(status, body))
}

fn rejection(status: u16, body: &str) -> PublishError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let mut message = parsed.message;
    let details: Vec<String> = parsed
        .errors
        .into_iter()
        .filter_map(|e| e.message)
        .collect();
    if !details.is_empty() {
        message = format!("{message} ({})", details.join("; "));
    }
    if message.trim().is_empty() {
        message = body.trim().to_string();
    }
    PublishError::Rejected { status, message }
}
