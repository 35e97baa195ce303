//! `file-sync files`: print the resolved file list.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use filesync_core::{
    config::{ENV_DELETE_FILES, ENV_FILES},
    parse_file_list, parse_path_list,
};

use super::ConfigArgs;

/// Arguments for `file-sync files`.
#[derive(Args, Debug)]
pub struct FilesArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "action")]
    action: &'static str,
}

impl FilesArgs {
    /// Only the file inputs are read, so this works without the rest of
    /// the run configuration.
    pub fn run(self) -> Result<()> {
        let files = self
            .config
            .lookup(ENV_FILES)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("env variable {ENV_FILES} is empty"))?;
        let deletions = self
            .config
            .lookup(ENV_DELETE_FILES)
            .map(|v| parse_path_list(&v))
            .unwrap_or_default();

        let mut rows: Vec<FileRow> = parse_file_list(&files)
            .into_iter()
            .map(|m| FileRow {
                source: m.source,
                destination: m.destination,
                action: "copy",
            })
            .collect();
        rows.extend(deletions.into_iter().map(|path| FileRow {
            source: "-".to_string(),
            destination: path,
            action: "delete",
        }));

        if rows.is_empty() {
            println!("No files configured.");
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
