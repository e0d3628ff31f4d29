//! Token-bounded textual summary of a branch diff.
//!
//! Only files carrying a patch are rendered, at most `max_files` of them, each
//! patch cut to `max_patch_lines` lines plus an omission marker. The limits
//! keep the text inside a fixed prompt budget and are configurable.

use serde::{Deserialize, Serialize};

use crate::git_providers::{DiffSummary, FileChange};

pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_MAX_PATCH_LINES: usize = 20;
pub const TRUNCATION_MARKER: &str = "... (additional changes omitted)";
pub const FILE_SEPARATOR: &str = "\n---\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub max_files: usize,
    pub max_patch_lines: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_patch_lines: DEFAULT_MAX_PATCH_LINES,
        }
    }
}

/// Formatted diff text plus whether any real patch made it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffContext {
    pub text: String,
    /// False means downstream generation works from the issue alone.
    pub used_diff: bool,
    pub included_files: Vec<String>,
}

/// Renders `diff` as a summary block followed by one block per patched file.
pub fn format_diff_context(diff: &DiffSummary, options: FormatOptions) -> DiffContext {
    let eligible: Vec<&FileChange> = diff
        .files
        .iter()
        .filter(|f| f.has_patch())
        .take(options.max_files)
        .collect();

    let mut text = summary_block(diff);

    if !eligible.is_empty() {
        text.push_str("\n## Changed files\n\n");
        let blocks: Vec<String> = eligible
            .iter()
            .map(|f| file_block(f, options.max_patch_lines))
            .collect();
        text.push_str(&blocks.join(FILE_SEPARATOR));
    }

    DiffContext {
        text,
        used_diff: !eligible.is_empty(),
        included_files: eligible.iter().map(|f| f.filename.clone()).collect(),
    }
}

fn summary_block(diff: &DiffSummary) -> String {
    let t = &diff.totals;
    format!(
        "## Code changes\n\
         Repository: {}\n\
         Source branch: {}\n\
         Target branch: {}\n\
         Commits: {}\n\
         Files changed: {}\n\
         Additions: {}\n\
         Deletions: {}\n",
        diff.repository,
        diff.source_branch,
        diff.target_branch,
        t.commits,
        t.changed_files,
        t.additions,
        t.deletions
    )
}

fn file_block(file: &FileChange, max_patch_lines: usize) -> String {
    let patch = file.patch.as_deref().unwrap_or_default();
    let (lines, truncated) = truncate_lines(patch, max_patch_lines);

    let mut s = format!(
        "File: {}\nStatus: {}\nChanges: +{} -{}\n```diff\n",
        file.filename, file.status, file.additions, file.deletions
    );
    for line in lines {
        s.push_str(line);
        s.push('\n');
    }
    if truncated {
        s.push_str(TRUNCATION_MARKER);
        s.push('\n');
    }
    s.push_str("```\n");
    s
}

/// First `max` lines of `text` and whether anything was cut.
pub fn truncate_lines(text: &str, max: usize) -> (Vec<&str>, bool) {
    let all: Vec<&str> = text.lines().collect();
    let truncated = all.len() > max;
    (all.into_iter().take(max).collect(), truncated)
}
