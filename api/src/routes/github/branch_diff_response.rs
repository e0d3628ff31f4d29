use git_context_engine::{
    formatter::DiffContext,
    git_providers::{Branch, DiffSummary, Repository},
};
use serde::Serialize;

/// Diff of the branch matched for an issue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDiffResponse {
    pub repository: Repository,
    pub branch: Branch,
    pub diff_summary: DiffSummary,
    pub diff_context: DiffContext,
    pub used_diff: bool,
}
