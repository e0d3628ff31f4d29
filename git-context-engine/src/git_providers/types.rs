//! Provider-agnostic data model for repositories, branch diffs and content trees.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{GitContextEngineProviderError, GitContextEngineResult};

/// Bearer credential of one connected source-control account.
///
/// Threaded explicitly into every provider call; never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns the raw token, or `AuthError` when it is blank.
    pub fn token(&self) -> GitContextEngineResult<&str> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(GitContextEngineProviderError::Auth.into());
        }
        Ok(token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Snapshot of a repository the account can access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    pub default_branch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub is_default: bool,
}

/// Work item supplied by the caller (e.g. a Linear issue `ABC-123`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueReference {
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl IssueReference {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            description: None,
            url: None,
        }
    }
}

/// Per-file status reported by a branch comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File-level change between two branches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u64,
    pub deletions: u64,
    /// Unified diff fragment; absent for binary or very large files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

impl FileChange {
    pub fn has_patch(&self) -> bool {
        self.patch.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// A commit listed in a comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonCommit {
    pub sha: String,
    pub message: String,
}

/// Raw comparison payload between `base` and `head`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comparison {
    pub commits: Vec<ComparisonCommit>,
    pub files: Vec<FileChange>,
}

/// Aggregate counts of a [`DiffSummary`]; always derived from its files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffTotals {
    pub commits: usize,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: usize,
}

/// File-level change-set between a source branch and the target branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub repository: String,
    pub source_branch: String,
    pub target_branch: String,
    /// Order is the comparison's order; never re-sorted.
    pub files: Vec<FileChange>,
    #[serde(rename = "totalChanges")]
    pub totals: DiffTotals,
}

impl DiffSummary {
    /// Builds a summary whose totals are summed from `files`.
    pub fn new(
        repository: impl Into<String>,
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
        commits: usize,
        files: Vec<FileChange>,
    ) -> Self {
        let totals = DiffTotals {
            commits,
            additions: files.iter().map(|f| f.additions).sum(),
            deletions: files.iter().map(|f| f.deletions).sum(),
            changed_files: files.len(),
        };
        Self {
            repository: repository.into(),
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            files,
            totals,
        }
    }

    /// True when at least one file carries non-empty patch text.
    pub fn has_patches(&self) -> bool {
        self.files.iter().any(FileChange::has_patch)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One item of a content listing as returned upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// Listing at a path: a directory's entries or a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentListing {
    Directory(Vec<ContentEntry>),
    File(ContentEntry),
}

/// Node of a materialized repository tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentNode {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub size: u64,
    /// Decoded text for files when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Kept only when the content could not be decoded to text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Expanded children of a directory; empty when not expanded or unreadable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn is_dir(&self) -> bool {
        self.kind == ContentKind::Dir
    }
}

/// Result of a tree fetch at a path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ContentTree {
    Directory(Vec<ContentNode>),
    File(ContentNode),
}

impl ContentTree {
    /// Text content when the tree is a single decoded file.
    pub fn file_text(&self) -> Option<&str> {
        match self {
            ContentTree::File(node) if node.encoding.is_none() => node.content.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(additions: u64, deletions: u64, patch: Option<&str>) -> FileChange {
        FileChange {
            filename: "src/lib.rs".into(),
            status: FileStatus::Modified,
            additions,
            deletions,
            patch: patch.map(str::to_string),
            previous_filename: None,
        }
    }

    #[test]
    fn totals_are_sums_over_files() {
        let summary = DiffSummary::new(
            "org/app",
            "fix/abc-1",
            "main",
            4,
            vec![change(3, 1, Some("@@")), change(10, 0, None), change(0, 7, None)],
        );
        assert_eq!(summary.totals.additions, 13);
        assert_eq!(summary.totals.deletions, 8);
        assert_eq!(summary.totals.changed_files, 3);
        assert_eq!(summary.totals.commits, 4);
    }

    #[test]
    fn totals_of_empty_file_list_are_zero() {
        let summary = DiffSummary::new("org/app", "a", "main", 0, Vec::new());
        assert_eq!(summary.totals, DiffTotals::default());
        assert!(!summary.has_patches());
    }

    #[test]
    fn empty_patch_text_is_not_a_patch() {
        assert!(!change(1, 1, Some("")).has_patch());
        assert!(change(1, 1, Some("@@ -1 +1 @@")).has_patch());
    }

    #[test]
    fn credential_debug_is_redacted_and_blank_is_auth_error() {
        let cred = Credential::bearer("gho_secret");
        assert!(!format!("{cred:?}").contains("gho_secret"));
        assert!(Credential::bearer("  ").token().unwrap_err().is_auth());
    }

    #[test]
    fn summary_serializes_with_camel_case_totals() {
        let summary = DiffSummary::new("org/app", "feat", "main", 1, vec![change(1, 2, None)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["sourceBranch"], "feat");
        assert_eq!(json["totalChanges"]["changedFiles"], 1);
        assert_eq!(json["files"][0]["status"], "modified");
    }
}
