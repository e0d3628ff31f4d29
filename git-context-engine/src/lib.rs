pub mod config;
pub mod context;
pub mod diff;
pub mod errors;
pub mod formatter;
pub mod git_providers;
pub mod matcher;
pub mod prompt;
pub mod scanner;
pub mod tree;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    diff::DiffFetcher,
    errors::{GitContextEngineError, GitContextEngineResult},
    formatter::{DiffContext, FormatOptions, format_diff_context},
    git_providers::{Credential, DiffSummary, IssueReference, SourceControlApi},
    matcher::{BranchMatch, BranchMatcher, MatchOutcome, NoMatch},
    scanner::RepositoryScanner,
};

/// Diff of the branch resolved for an issue, with its prompt-ready rendering.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueDiff {
    pub matched: BranchMatch,
    pub summary: DiffSummary,
    pub context: DiffContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueDiffOutcome {
    Resolved(IssueDiff),
    /// No branch in any accessible repository matched the issue.
    NoMatch(NoMatch),
}

/// Resolves the branch for `issue` and summarizes it against its default branch.
///
/// Invoked by the HTTP layer for `/github/branch-diff`. It:
///   * lists every repository the credential can reach
///   * finds the first branch matching the issue's candidate patterns
///   * compares the repository's default branch with the matched branch
///   * renders the bounded diff context
///
/// An empty identifier is a `Validation` error. Auth failures at any step
/// propagate as-is so callers can ask the user to reconnect.
#[instrument(skip_all, fields(issue = %issue.identifier))]
pub async fn resolve_issue_diff<A: SourceControlApi>(
    api: &A,
    credential: &Credential,
    issue: &IssueReference,
    options: FormatOptions,
) -> GitContextEngineResult<IssueDiffOutcome> {
    if issue.identifier.trim().is_empty() {
        return Err(GitContextEngineError::Validation(
            "issue identifier is required".into(),
        ));
    }
    credential.token()?;

    let repositories = RepositoryScanner::new(api)
        .list_repositories(credential)
        .await?;
    debug!(repositories = repositories.len(), "repositories listed");

    let matched = match BranchMatcher::new(api)
        .find_match(credential, issue, &repositories)
        .await?
    {
        MatchOutcome::Found(m) => m,
        MatchOutcome::NotFound(no_match) => return Ok(IssueDiffOutcome::NoMatch(no_match)),
    };

    let summary = DiffFetcher::new(api)
        .compare(
            credential,
            &matched.repository.full_name,
            &matched.repository.default_branch,
            &matched.branch.name,
        )
        .await?;
    let context = format_diff_context(&summary, options);

    info!(
        repository = %matched.repository.full_name,
        branch = %matched.branch.name,
        files = context.included_files.len(),
        used_diff = context.used_diff,
        "issue diff resolved"
    );

    Ok(IssueDiffOutcome::Resolved(IssueDiff {
        matched,
        summary,
        context,
    }))
}
