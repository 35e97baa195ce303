//! File-list resolution.
//!
//! The list is newline-delimited. Each non-blank line is either `path`
//! (synced to the same path) or `source=destination`, split on the first
//! `=` only. Order is preserved so logs and staging are deterministic.

use crate::types::FileMapping;

/// Resolve a file-list blob into ordered [`FileMapping`]s.
///
/// Never fails. When one side of `source=destination` is empty the other side
/// is used for both, and a bare `=` is dropped.
pub fn parse_file_list(text: &str) -> Vec<FileMapping> {
    let files: Vec<FileMapping> = text.lines().filter_map(parse_line).collect();
    tracing::debug!("resolved {} file mapping(s)", files.len());
    files
}

fn parse_line(line: &str) -> Option<FileMapping> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.split_once('=') {
        None => Some(FileMapping::same(line)),
        Some((source, destination)) => match (source.trim(), destination.trim()) {
            ("", "") => None,
            (source, "") => Some(FileMapping::same(source)),
            ("", destination) => Some(FileMapping::same(destination)),
            (source, destination) => Some(FileMapping::new(source, destination)),
        },
    }
}

/// Resolve a newline-delimited list of plain paths (trimmed, blanks skipped).
pub fn parse_path_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
