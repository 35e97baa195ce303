//! [`GitBackend`] implemented by shelling out to the `git` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use filesync_core::redact_url;

use crate::backend::GitBackend;
use crate::error::{GitError, GitOp};
use crate::tolerate::{is_branch_exists, is_unknown_revision};

/// Runs `git` subprocesses. Interactive credential prompts are disabled so a
/// bad token fails fast instead of hanging the run.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, op: GitOp, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        tracing::debug!("git {} (in {})", display_args(args), dir.display());

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| GitError::Spawn { op, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(GitError::Failed {
            op,
            detail: redact_detail(&detail),
        })
    }
}

impl GitBackend for GitCli {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        let parent = dest.parent().unwrap_or(dest);
        let dest = dest.to_string_lossy();
        self.run(GitOp::Clone, parent, &["clone", "--quiet", url, &dest])
            .map(drop)
    }

    fn set_config(&self, repo: &Path, key: &str, value: &str) -> Result<(), GitError> {
        self.run(GitOp::Config, repo, &["config", "--local", key, value])
            .map(drop)
    }

    fn fetch(&self, repo: &Path) -> Result<(), GitError> {
        self.run(GitOp::Fetch, repo, &["fetch", "--quiet", "origin"])
            .map(drop)
    }

    fn branch(&self, repo: &Path, name: &str, start_point: &str) -> Result<(), GitError> {
        match self.run(GitOp::Branch, repo, &["branch", "--no-track", name, start_point]) {
            Ok(_) => Ok(()),
            Err(GitError::Failed { detail, .. }) if is_branch_exists(&detail) => {
                tracing::info!("branch {name} already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn checkout(&self, repo: &Path, name: &str) -> Result<(), GitError> {
        self.run(GitOp::Checkout, repo, &["checkout", "--quiet", name])
            .map(drop)
    }

    fn reset_hard(&self, repo: &Path, remote_ref: &str) -> Result<(), GitError> {
        match self.run(GitOp::Reset, repo, &["reset", "--hard", "--quiet", remote_ref]) {
            Ok(_) => Ok(()),
            Err(GitError::Failed { detail, .. }) if is_unknown_revision(&detail) => {
                tracing::info!("{remote_ref} does not exist yet; keeping local branch");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn status_short(&self, repo: &Path, path: &str) -> Result<String, GitError> {
        let out = self.run(GitOp::Status, repo, &["status", "--porcelain", "--", path])?;
        Ok(out.trim_end().to_string())
    }

    fn add(&self, repo: &Path, path: &str) -> Result<(), GitError> {
        self.run(GitOp::Add, repo, &["add", "--", path]).map(drop)
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<(), GitError> {
        self.run(GitOp::Commit, repo, &["commit", "--quiet", "-m", message])
            .map(drop)
    }

    fn push(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run(
            GitOp::Push,
            repo,
            &["push", "--quiet", "--set-upstream", "origin", branch],
        )
        .map(drop)
    }
}

fn display_args(args: &[&str]) -> String {
    args.iter()
        .map(|a| redact_url(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// git echoes remote URLs in some failures; strip credentials from them.
fn redact_detail(detail: &str) -> String {
    detail
        .split(' ')
        .map(|word| {
            let trimmed = word.trim_matches(|c: char| c == '\'' || c == '"');
            if trimmed.contains("://") {
                word.replace(trimmed, &redact_url(trimmed))
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
