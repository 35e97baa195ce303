//! Local git fixtures: a bare "remote" seeded through a scratch clone.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare repository with a `main` branch holding `files`.
pub struct Remote {
    root: TempDir,
    pub bare: PathBuf,
}

impl Remote {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let root = TempDir::new().expect("tempdir");
        let bare = root.path().join("remote.git");
        fs::create_dir_all(&bare).expect("mkdir bare");
        git(&bare, &["init", "--bare", "--quiet", "--initial-branch=main"]);

        let remote = Self { root, bare };
        remote.commit_files("main", files, "seed");
        remote
    }

    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    /// Commit `files` on `branch` (created from `main` if needed) and push.
    pub fn commit_files(&self, branch: &str, files: &[(&str, &str)], message: &str) {
        let seed = TempDir::new_in(self.root.path()).expect("seed dir");
        let dir = seed.path();
        git(dir, &["init", "--quiet", "--initial-branch=main"]);
        git(dir, &["config", "user.name", "seed"]);
        git(dir, &["config", "user.email", "seed@example.com"]);
        git(dir, &["remote", "add", "origin", &self.url()]);
        git(dir, &["fetch", "--quiet", "origin"]);
        if self.has_branch(branch) {
            git(dir, &["checkout", "--quiet", "-B", branch, &format!("origin/{branch}")]);
        } else if self.has_branch("main") {
            git(dir, &["checkout", "--quiet", "-B", branch, "origin/main"]);
        } else if branch != "main" {
            git(dir, &["checkout", "--quiet", "-b", branch]);
        }
        for (path, content) in files {
            let target = dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(&target, content).expect("write");
        }
        git(dir, &["add", "--all"]);
        git(dir, &["commit", "--quiet", "--allow-empty", "-m", message]);
        git(dir, &["push", "--quiet", "origin", &format!("HEAD:{branch}")]);
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .current_dir(&self.bare)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn show(&self, branch: &str, path: &str) -> String {
        git(&self.bare, &["show", &format!("{branch}:{path}")])
    }

    pub fn commit_count(&self, branch: &str) -> usize {
        git(&self.bare, &["rev-list", "--count", branch])
            .parse()
            .expect("count")
    }

    /// `name|email|subject` of the tip of `branch`.
    pub fn tip_signature(&self, branch: &str) -> String {
        git(&self.bare, &["log", "-1", "--format=%an|%ae|%s", branch])
    }
}
