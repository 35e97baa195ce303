//! Domain types for a file-sync run.
//!
//! Repository-relative paths are kept as `String` because they are handed to
//! git verbatim; they only become `PathBuf`s once joined onto a working copy
//! root.

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed git branch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BranchName(pub String);

impl BranchName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The remote-tracking ref for this branch on `origin`.
    pub fn remote_ref(&self) -> String {
        format!("origin/{}", self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BranchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// An `owner/name` repository coordinate on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// HTTPS clone URL on `server`, with the token embedded as userinfo when
    /// one is available.
    pub fn clone_url(&self, server: &str, token: Option<&str>) -> String {
        let server = server.trim_end_matches('/');
        let (scheme, host) = server
            .split_once("://")
            .unwrap_or(("https", server));
        match token {
            Some(token) => format!(
                "{scheme}://x-access-token:{token}@{host}/{}/{}.git",
                self.owner, self.name
            ),
            None => format!("{scheme}://{host}/{}/{}.git", self.owner, self.name),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = ConfigError;

    /// Parse `owner/name`. Used for values that did not come from a named
    /// environment variable; [`crate::config`] reports its own key instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_slug("repository", s)
    }
}

pub(crate) fn parse_slug(key: &'static str, value: &str) -> Result<RepoSlug, ConfigError> {
    let parts: Vec<&str> = value.trim().split('/').collect();
    match parts.as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(RepoSlug::new(*owner, *name)),
        _ => Err(ConfigError::Malformed {
            key,
            value: value.to_string(),
        }),
    }
}

/// `value` as `owner/name`, or as a bare `name` owned by `owner`.
pub(crate) fn parse_owned_slug(
    key: &'static str,
    value: &str,
    owner: &str,
) -> Result<RepoSlug, ConfigError> {
    if value.contains('/') {
        parse_slug(key, value)
    } else {
        Ok(RepoSlug::new(owner, value.trim()))
    }
}

/// `owner/<regex>`: every repository of `owner` whose name matches.
///
/// Matching is case-insensitive and anchored at the start of the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoPattern {
    pub owner: String,
    pub pattern: String,
}

impl RepoPattern {
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&format!("^(?:{})", self.pattern))
            .case_insensitive(true)
            .build()
    }
}

impl fmt::Display for RepoPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.pattern)
    }
}

pub(crate) fn parse_pattern(key: &'static str, value: &str) -> Result<RepoPattern, ConfigError> {
    let malformed = || ConfigError::Malformed {
        key,
        value: value.to_string(),
    };
    let (owner, pattern) = value.trim().split_once('/').ok_or_else(malformed)?;
    if owner.is_empty() || pattern.is_empty() {
        return Err(malformed());
    }
    let parsed = RepoPattern {
        owner: owner.to_string(),
        pattern: pattern.to_string(),
    };
    parsed.compile().map_err(|_| malformed())?;
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One entry of the file list: copy `source` (relative to the source
/// repository root) to `destination` (relative to the destination root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileMapping {
    pub source: String,
    pub destination: String,
}

impl FileMapping {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// A mapping whose destination equals its source.
    pub fn same(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            source: path.clone(),
            destination: path,
        }
    }
}

impl fmt::Display for FileMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source == self.destination {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{}={}", self.source, self.destination)
        }
    }
}

/// Commit author identity, applied per clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Presentation of the pull request opened for the sync branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestOptions {
    pub title: String,
    /// `None` means a body is generated from the synced file list.
    pub body: Option<String>,
    pub draft: bool,
}

/// Replace any userinfo in `url` with `***` so tokens never reach logs.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://***@{}", &rest[at + 1..]),
        None => url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
