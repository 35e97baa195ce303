pub mod diff;
pub mod files;
pub mod run;

use anyhow::{Context, Result};
use clap::Args;

use filesync_core::{config::ENV_FILES, SyncConfig};

/// File list used by `--use-default-files` when `INPUT_FILES` is unset.
pub const DEFAULT_FILES: &str = "\
.tflint.hcl
test/src/go.mod
examples/complete/main.tf
.github/CODEOWNERS
.github/workflows/release.yml";

/// Configuration flags shared by every subcommand.
#[derive(Args, Debug, Clone, Copy)]
pub struct ConfigArgs {
    /// Fall back to the built-in file list when INPUT_FILES is unset.
    #[arg(long)]
    pub use_default_files: bool,
}

impl ConfigArgs {
    pub fn load(self) -> Result<SyncConfig> {
        SyncConfig::from_lookup(|key| self.lookup(key))
            .context("invalid configuration in environment")
    }

    /// Read `key` from the process environment, substituting
    /// [`DEFAULT_FILES`] for a blank file list when requested.
    pub fn lookup(self, key: &str) -> Option<String> {
        let value = std::env::var(key).ok();
        let blank = value.as_deref().map_or(true, |v| v.trim().is_empty());
        if key == ENV_FILES && blank && self.use_default_files {
            return Some(DEFAULT_FILES.to_string());
        }
        value
    }
}
