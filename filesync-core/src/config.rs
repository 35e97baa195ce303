//! Environment-derived run configuration.
//!
//! Every value is read through a lookup function so callers (and tests) can
//! substitute the process environment. Empty values count as unset.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConfigError;
use crate::files::{parse_file_list, parse_path_list};
use crate::types::{
    parse_owned_slug, parse_pattern, parse_slug, BranchName, FileMapping, Identity,
    PullRequestOptions, RepoPattern, RepoSlug,
};

pub const DEFAULT_SERVER_URL: &str = "https://github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const ENV_WORKSPACE: &str = "GITHUB_WORKSPACE";
pub const ENV_TOKEN: &str = "INPUT_TOKEN";
pub const ENV_SOURCE_REPO: &str = "INPUT_REPO";
pub const ENV_SOURCE_BRANCH: &str = "INPUT_SOURCE_BRANCH";
pub const ENV_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
pub const ENV_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_DESTINATION_REPOS: &str = "INPUT_DESTINATION_REPOS";
pub const ENV_DESTINATION_REPOS_REGEX: &str = "INPUT_DESTINATION_REPOS_REGEX";
pub const ENV_DESTINATION_REPOS_EXCLUDE: &str = "INPUT_DESTINATION_REPOS_EXCLUDE";
pub const ENV_TARGET_BRANCH: &str = "INPUT_TARGET_BRANCH";
pub const ENV_PULL_REQUEST_BRANCH: &str = "INPUT_PULL_REQUEST_BRANCH";
pub const ENV_USER: &str = "INPUT_USER";
pub const ENV_EMAIL: &str = "INPUT_EMAIL";
pub const ENV_COMMIT_MESSAGE: &str = "INPUT_COMMIT_MESSAGE";
pub const ENV_FILES: &str = "INPUT_FILES";
pub const ENV_DELETE_FILES: &str = "INPUT_DELETE_FILES";
pub const ENV_PULL_REQUEST_TITLE: &str = "INPUT_PULL_REQUEST_TITLE";
pub const ENV_PULL_REQUEST_BODY: &str = "INPUT_PULL_REQUEST_BODY";
pub const ENV_PULL_REQUEST_DRAFT: &str = "INPUT_PULL_REQUEST_DRAFT";
pub const ENV_SERVER_URL: &str = "GITHUB_SERVER_URL";
pub const ENV_API_URL: &str = "GITHUB_API_URL";

/// Which repositories receive the files.
///
/// Explicit repositories and pattern matches are merged, exclusions removed,
/// and the result sorted without duplicates by [`Self::select`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DestinationSet {
    pub repos: Vec<RepoSlug>,
    pub patterns: Vec<RepoPattern>,
    pub exclude: Vec<RepoSlug>,
}

impl DestinationSet {
    /// A set holding exactly `repo`.
    pub fn single(repo: RepoSlug) -> Self {
        Self {
            repos: vec![repo],
            ..Self::default()
        }
    }

    /// Repositories among `listed` selected by one of [`Self::patterns`].
    pub fn matching<'a>(&self, listed: impl IntoIterator<Item = &'a RepoSlug>) -> Vec<RepoSlug> {
        let compiled: Vec<_> = self
            .patterns
            .iter()
            .filter_map(|p| match p.compile() {
                Ok(regex) => Some((p.owner.as_str(), regex)),
                Err(err) => {
                    tracing::warn!("ignoring pattern {p}: {err}");
                    None
                }
            })
            .collect();
        listed
            .into_iter()
            .filter(|repo| {
                compiled.iter().any(|(owner, regex)| {
                    repo.owner.eq_ignore_ascii_case(owner) && regex.is_match(&repo.name)
                })
            })
            .cloned()
            .collect()
    }

    /// Final destination list given the repositories `discovered` through
    /// [`Self::patterns`].
    pub fn select(&self, discovered: impl IntoIterator<Item = RepoSlug>) -> Vec<RepoSlug> {
        let mut selected: BTreeSet<RepoSlug> = self.repos.iter().cloned().collect();
        selected.extend(discovered);
        for excluded in &self.exclude {
            selected.remove(excluded);
        }
        selected.into_iter().collect()
    }
}

/// Fully resolved inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Parent directory for the run's temporary working copies.
    pub workspace: PathBuf,
    pub token: Option<String>,
    pub source_repo: RepoSlug,
    /// Branch to read source files from; the remote default when `None`.
    pub source_branch: Option<BranchName>,
    pub owner: String,
    pub destinations: DestinationSet,
    pub target_branch: BranchName,
    pub pull_request_branch: BranchName,
    pub identity: Identity,
    pub commit_message: String,
    pub files: Vec<FileMapping>,
    pub delete_files: Vec<String>,
    pub pull_request: PullRequestOptions,
    pub server_url: String,
    pub api_url: String,
}

impl SyncConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let workspace = PathBuf::from(env.required(ENV_WORKSPACE)?);
        let token = env.optional(ENV_TOKEN);
        if token.is_none() {
            tracing::warn!("env variable {ENV_TOKEN} is empty");
        }

        let owner = env.required(ENV_OWNER)?;
        let source_repo =
            parse_owned_slug(ENV_SOURCE_REPO, &env.required(ENV_SOURCE_REPO)?, &owner)?;
        let source_branch = env.optional(ENV_SOURCE_BRANCH).map(BranchName::from);
        let destinations = env.destinations(&owner)?;

        let target_branch = BranchName::from(env.required(ENV_TARGET_BRANCH)?);
        let pull_request_branch = BranchName::from(env.required(ENV_PULL_REQUEST_BRANCH)?);
        let identity = Identity {
            name: env.required(ENV_USER)?,
            email: env.required(ENV_EMAIL)?,
        };
        let commit_message = env.required(ENV_COMMIT_MESSAGE)?;
        let files = parse_file_list(&env.required(ENV_FILES)?);
        let delete_files = env.list(ENV_DELETE_FILES);

        let pull_request = PullRequestOptions {
            title: env
                .optional(ENV_PULL_REQUEST_TITLE)
                .unwrap_or_else(|| commit_message.clone()),
            body: env.optional(ENV_PULL_REQUEST_BODY),
            draft: env.flag(ENV_PULL_REQUEST_DRAFT)?,
        };

        let config = Self {
            workspace,
            token,
            source_repo,
            source_branch,
            owner,
            destinations,
            target_branch,
            pull_request_branch,
            identity,
            commit_message,
            files,
            delete_files,
            pull_request,
            server_url: env
                .optional(ENV_SERVER_URL)
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            api_url: env
                .optional(ENV_API_URL)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };
        config.log_resolved();
        Ok(config)
    }

    /// Clone URL of the source repository.
    pub fn source_url(&self) -> String {
        self.source_repo
            .clone_url(&self.server_url, self.token.as_deref())
    }

    /// Clone URL of a destination repository.
    pub fn destination_url(&self, repo: &RepoSlug) -> String {
        repo.clone_url(&self.server_url, self.token.as_deref())
    }

    fn log_resolved(&self) {
        tracing::debug!("workspace: {}", self.workspace.display());
        tracing::debug!("source repo: {}", self.source_repo);
        for repo in &self.destinations.repos {
            tracing::debug!("destination repo: {repo}");
        }
        for pattern in &self.destinations.patterns {
            tracing::debug!("destination pattern: {pattern}");
        }
        for repo in &self.destinations.exclude {
            tracing::debug!("excluded repo: {repo}");
        }
        tracing::debug!("target branch: {}", self.target_branch);
        tracing::debug!("pull request branch: {}", self.pull_request_branch);
        tracing::debug!("user: {} <{}>", self.identity.name, self.identity.email);
        tracing::debug!("commit message: {}", self.commit_message);
        for file in &self.files {
            tracing::debug!("configured file: {file}");
        }
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing { key })
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.optional(key)
            .map(|v| parse_path_list(&v))
            .unwrap_or_default()
    }

    fn slugs(&self, key: &'static str, owner: &str) -> Result<Vec<RepoSlug>, ConfigError> {
        self.list(key)
            .iter()
            .map(|value| parse_owned_slug(key, value, owner))
            .collect()
    }

    /// Explicit and pattern destinations; without either, the repository
    /// named by `GITHUB_REPOSITORY`, re-homed under `owner`.
    fn destinations(&self, owner: &str) -> Result<DestinationSet, ConfigError> {
        let repos = self.slugs(ENV_DESTINATION_REPOS, owner)?;
        let patterns = self
            .list(ENV_DESTINATION_REPOS_REGEX)
            .iter()
            .map(|value| parse_pattern(ENV_DESTINATION_REPOS_REGEX, value))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude = self.slugs(ENV_DESTINATION_REPOS_EXCLUDE, owner)?;

        if repos.is_empty() && patterns.is_empty() {
            let repository = self.required(ENV_REPOSITORY)?;
            let name = parse_slug(ENV_REPOSITORY, &repository)?.name;
            return Ok(DestinationSet {
                exclude,
                ..DestinationSet::single(RepoSlug::new(owner, name))
            });
        }
        Ok(DestinationSet {
            repos,
            patterns,
            exclude,
        })
    }

    fn flag(&self, key: &'static str) -> Result<bool, ConfigError> {
        match self.optional(key) {
            None => Ok(false),
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::Malformed { key, value }),
            },
        }
    }
}
