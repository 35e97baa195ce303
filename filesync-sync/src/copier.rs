//! Whole-file copy from the source working copy into the destination.
//!
//! ## `copy_file` protocol
//!
//! 1. Read the full source content.
//! 2. Compare with the current destination bytes → skip if identical.
//! 3. Create missing parent directories.
//! 4. Write to `<dest>.file-sync.tmp`, keeping the mode of the file being
//!    replaced; new files get `0644`.
//! 5. Rename to the final path. The temporary file is removed if any step
//!    after its creation fails.
//!
//! [`copy_all`] and [`delete_all`] never fail: each per-file failure is
//! logged and reported, and the next file is processed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use filesync_core::FileMapping;

use crate::error::{io_err, SyncError};

#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of copying a single mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CopyResult {
    /// Destination was created or overwritten.
    Copied { mapping: FileMapping },
    /// Destination already held the source bytes.
    Unchanged { mapping: FileMapping },
    /// Copy failed; the run continues without this file.
    Failed { mapping: FileMapping, reason: String },
}

impl CopyResult {
    pub fn mapping(&self) -> &FileMapping {
        match self {
            CopyResult::Copied { mapping }
            | CopyResult::Unchanged { mapping }
            | CopyResult::Failed { mapping, .. } => mapping,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CopyResult::Failed { .. })
    }
}

/// Outcome of removing a single destination path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DeleteResult {
    Deleted { path: String },
    /// Nothing to delete.
    Absent { path: String },
    Failed { path: String, reason: String },
}

impl DeleteResult {
    pub fn path(&self) -> &str {
        match self {
            DeleteResult::Deleted { path }
            | DeleteResult::Absent { path }
            | DeleteResult::Failed { path, .. } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// copy
// ---------------------------------------------------------------------------

/// Copy every mapping from `source_root` into `dest_root`, in order.
pub fn copy_all(mappings: &[FileMapping], source_root: &Path, dest_root: &Path) -> Vec<CopyResult> {
    mappings
        .iter()
        .map(|mapping| {
            let source = source_root.join(&mapping.source);
            let dest = dest_root.join(&mapping.destination);
            tracing::debug!("copying {} to {}", source.display(), dest.display());
            match copy_file(&source, &dest) {
                Ok(true) => {
                    tracing::info!("copied: {mapping}");
                    CopyResult::Copied {
                        mapping: mapping.clone(),
                    }
                }
                Ok(false) => {
                    tracing::debug!("unchanged: {mapping}");
                    CopyResult::Unchanged {
                        mapping: mapping.clone(),
                    }
                }
                Err(e) => {
                    tracing::error!("error copying file {}: {e}", source.display());
                    CopyResult::Failed {
                        mapping: mapping.clone(),
                        reason: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

/// Copy one file. Returns `Ok(false)` when the destination already matched.
pub fn copy_file(source: &Path, dest: &Path) -> Result<bool, SyncError> {
    let content = fs::read(source).map_err(|e| io_err(source, e))?;

    // An unreadable `dest` falls through; the write below reports it.
    if let Ok(existing) = fs::read(dest) {
        if existing == content {
            return Ok(false);
        }
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = PathBuf::from(format!("{}.file-sync.tmp", dest.display()));
    let permissions = target_permissions(dest);
    if let Err(e) = replace_via(&tmp, dest, &content, permissions) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(true)
}

fn replace_via(
    tmp: &Path,
    dest: &Path,
    content: &[u8],
    permissions: Option<fs::Permissions>,
) -> Result<(), SyncError> {
    fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp, permissions).map_err(|e| io_err(tmp, e))?;
    }
    fs::rename(tmp, dest).map_err(|e| io_err(dest, e))
}

/// Permissions of the file being replaced, or `0644` for a new file.
fn target_permissions(dest: &Path) -> Option<fs::Permissions> {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_file() => Some(meta.permissions()),
        _ => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(FILE_MODE))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

/// Remove each destination-relative path under `dest_root`.
pub fn delete_all(paths: &[String], dest_root: &Path) -> Vec<DeleteResult> {
    paths
        .iter()
        .map(|path| {
            let target = dest_root.join(path);
            tracing::debug!("removing {}", target.display());
            match fs::remove_file(&target) {
                Ok(()) => {
                    tracing::info!("deleted: {path}");
                    DeleteResult::Deleted { path: path.clone() }
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("already absent: {path}");
                    DeleteResult::Absent { path: path.clone() }
                }
                Err(e) => {
                    tracing::error!("error removing file {}: {e}", target.display());
                    DeleteResult::Failed {
                        path: path.clone(),
                        reason: io_err(&target, e).to_string(),
                    }
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn roots() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn copies_into_nested_directories() {
        let (src, dst) = roots();
        fs::write(src.path().join("b.txt"), "Y").unwrap();

        let results = copy_all(
            &[FileMapping::new("b.txt", "c/d/b.txt")],
            src.path(),
            dst.path(),
        );
        assert!(matches!(results[0], CopyResult::Copied { .. }));
        assert_eq!(fs::read_to_string(dst.path().join("c/d/b.txt")).unwrap(), "Y");
    }

    #[test]
    fn overwrites_existing_destination() {
        let (src, dst) = roots();
        fs::write(src.path().join("a.txt"), "new").unwrap();
        fs::write(dst.path().join("a.txt"), "old").unwrap();

        let results = copy_all(&[FileMapping::same("a.txt")], src.path(), dst.path());
        assert!(matches!(results[0], CopyResult::Copied { .. }));
        assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn identical_destination_is_unchanged() {
        let (src, dst) = roots();
        fs::write(src.path().join("a.txt"), "same").unwrap();
        fs::write(dst.path().join("a.txt"), "same").unwrap();

        let results = copy_all(&[FileMapping::same("a.txt")], src.path(), dst.path());
        assert!(matches!(results[0], CopyResult::Unchanged { .. }));
    }

    #[test]
    fn missing_source_does_not_stop_other_copies() {
        let (src, dst) = roots();
        fs::write(src.path().join("one.txt"), "1").unwrap();
        fs::write(src.path().join("three.txt"), "3").unwrap();

        let results = copy_all(
            &[
                FileMapping::same("one.txt"),
                FileMapping::same("two.txt"),
                FileMapping::same("three.txt"),
            ],
            src.path(),
            dst.path(),
        );

        assert!(!results[0].is_failed());
        assert!(results[1].is_failed());
        assert!(!results[2].is_failed());
        assert_eq!(results[1].mapping().source, "two.txt");
        assert_eq!(fs::read_to_string(dst.path().join("one.txt")).unwrap(), "1");
        assert_eq!(fs::read_to_string(dst.path().join("three.txt")).unwrap(), "3");
        assert!(!dst.path().join("two.txt").exists());
    }

    #[test]
    fn directory_at_destination_is_a_failure_and_leaves_no_tmp() {
        let (src, dst) = roots();
        fs::write(src.path().join("a.txt"), "x").unwrap();
        fs::create_dir_all(dst.path().join("a.txt")).unwrap();

        let results = copy_all(&[FileMapping::same("a.txt")], src.path(), dst.path());
        assert!(results[0].is_failed());
        assert!(!dst.path().join("a.txt.file-sync.tmp").exists());
    }

    #[test]
    #[cfg(unix)]
    fn new_files_get_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (src, dst) = roots();
        let source = src.path().join("script.sh");
        fs::write(&source, "#!/bin/sh").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();

        copy_all(&[FileMapping::same("script.sh")], src.path(), dst.path());
        let mode = fs::metadata(dst.path().join("script.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    #[cfg(unix)]
    fn overwrite_keeps_destination_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (src, dst) = roots();
        fs::write(src.path().join("run.sh"), "#!/bin/sh\necho new\n").unwrap();
        let dest = dst.path().join("run.sh");
        fs::write(&dest, "#!/bin/sh\necho old\n").unwrap();
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o755)).unwrap();

        let results = copy_all(&[FileMapping::same("run.sh")], src.path(), dst.path());
        assert!(matches!(results[0], CopyResult::Copied { .. }));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "#!/bin/sh\necho new\n");
        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn delete_reports_each_path() {
        let dst = TempDir::new().unwrap();
        fs::write(dst.path().join("old.txt"), "bye").unwrap();
        fs::create_dir_all(dst.path().join("dir")).unwrap();

        let results = delete_all(
            &["old.txt".to_string(), "gone.txt".to_string(), "dir".to_string()],
            dst.path(),
        );
        assert!(matches!(results[0], DeleteResult::Deleted { .. }));
        assert!(matches!(results[1], DeleteResult::Absent { .. }));
        assert!(matches!(results[2], DeleteResult::Failed { .. }));
        assert!(!dst.path().join("old.txt").exists());
        assert!(dst.path().join("dir").exists());
    }
}
