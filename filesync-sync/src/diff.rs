//! Unified diffs of what a sync would change, for `file-sync diff`.

use std::io::ErrorKind;
use std::path::Path;

use similar::TextDiff;

use filesync_core::FileMapping;

/// A single destination file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Destination-relative path.
    pub path: String,
    pub unified_diff: String,
}

/// Compare each source file with its destination, and each deletion with
/// the file it would remove. Nothing is written.
///
/// Unreadable sources and destinations are skipped with a warning, matching
/// the copy policy.
pub fn diff_files(
    mappings: &[FileMapping],
    deletions: &[String],
    source_root: &Path,
    dest_root: &Path,
) -> Vec<FileDiff> {
    let mut diffs = Vec::new();

    for mapping in mappings {
        let source_path = source_root.join(&mapping.source);
        let incoming = match std::fs::read(&source_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("skipping {}: {e}", source_path.display());
                continue;
            }
        };
        let Some(existing) = read_existing_or_empty(&dest_root.join(&mapping.destination)) else {
            continue;
        };
        if existing == incoming {
            continue;
        }
        diffs.push(unified(&mapping.destination, &existing, &incoming));
    }

    for path in deletions {
        let target = dest_root.join(path);
        if !target.is_file() {
            continue;
        }
        let Some(existing) = read_existing_or_empty(&target) else {
            continue;
        };
        diffs.push(unified(path, &existing, &[]));
    }

    diffs
}

fn unified(path: &str, old: &[u8], new: &[u8]) -> FileDiff {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let old_header = format!("a/{path}");
    let new_header = format!("b/{path}");
    let unified_diff = TextDiff::from_lines(old.as_ref(), new.as_ref())
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    FileDiff {
        path: path.to_string(),
        unified_diff,
    }
}

/// A missing destination reads as empty; any other read error is logged and
/// yields `None`.
fn read_existing_or_empty(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Some(Vec::new()),
        Err(err) => {
            tracing::warn!("skipping {}: {err}", path.display());
            None
        }
    }
}
