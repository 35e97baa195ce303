//! Named predicates for backend failures that are treated as success.
//!
//! These are the only places git's diagnostic text is inspected.

/// `git branch <name>` when the branch is already present locally.
pub fn is_branch_exists(detail: &str) -> bool {
    detail.contains("already exists")
}

/// `git reset --hard origin/<name>` when the branch was never pushed.
pub fn is_unknown_revision(detail: &str) -> bool {
    detail.contains("unknown revision")
}
