//! Issue-to-branch matching.
//!
//! Candidate patterns are derived purely from the issue identifier and title,
//! following common tracker branch conventions such as
//! `feature/ABC-123-short-description` or `fix/abc-123-description`.
//! Matching is substring-based and first-match: repositories and branches are
//! visited in the order the scanner returns them and the scan stops at the
//! first hit. There is no relevance ranking.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{GitContextEngineError, GitContextEngineResult};
use crate::git_providers::{Branch, Credential, IssueReference, Repository, SourceControlApi};
use crate::scanner::RepositoryScanner;

/// Conventional branch prefixes tried in front of the identifier.
pub const BRANCH_PREFIXES: [&str; 6] = [
    "feature/", "fix/", "bugfix/", "hotfix/", "release/", "chore/",
];

/// Title words never used to build patterns.
pub const STOP_WORDS: [&str; 4] = ["the", "and", "for", "with"];

/// Selected repository/branch pair.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BranchMatch {
    pub repository: Repository,
    pub branch: Branch,
}

/// Diagnostics for a scan that found nothing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoMatch {
    pub possible_branches: Vec<String>,
    pub repositories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Found(BranchMatch),
    NotFound(NoMatch),
}

/// Lower-cased issue identifier used in every pattern.
pub fn branch_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Significant lower-cased title tokens.
///
/// Characters other than word characters, whitespace and `-` are dropped,
/// then tokens of at most two characters and stop words are discarded.
pub fn title_words(title: &str) -> Vec<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Every branch-name pattern derived from the issue, deduplicated in generation order.
///
/// Always non-empty and always starts with the bare lower-cased identifier.
pub fn candidate_patterns(issue: &IssueReference) -> Vec<String> {
    let id = branch_identifier(&issue.identifier);
    let words = title_words(&issue.title);
    let slashed = id.replacen('-', "/", 1);

    let mut patterns = Vec::with_capacity(1 + BRANCH_PREFIXES.len() * (2 + words.len()) + words.len());
    patterns.push(id.clone());
    patterns.extend(BRANCH_PREFIXES.iter().map(|p| format!("{p}{id}")));
    patterns.extend(BRANCH_PREFIXES.iter().map(|p| format!("{p}{slashed}")));
    patterns.extend(words.iter().map(|w| format!("{id}-{w}")));
    for prefix in BRANCH_PREFIXES {
        patterns.extend(words.iter().map(|w| format!("{prefix}{id}-{w}")));
    }

    let mut seen = std::collections::HashSet::new();
    patterns.retain(|p| seen.insert(p.clone()));
    patterns
}

/// True when the lower-cased branch name contains any pattern.
pub fn branch_matches(branch_name: &str, patterns: &[String]) -> bool {
    let name = branch_name.to_lowercase();
    patterns.iter().any(|p| name.contains(p.as_str()))
}

/// First branch, in the given order, matching any pattern.
pub fn first_matching_branch<'b>(branches: &'b [Branch], patterns: &[String]) -> Option<&'b Branch> {
    branches.iter().find(|b| branch_matches(&b.name, patterns))
}

/// Finds the branch holding the work for an issue across repositories.
#[derive(Debug)]
pub struct BranchMatcher<'a, A> {
    scanner: RepositoryScanner<'a, A>,
}

impl<'a, A: SourceControlApi> BranchMatcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            scanner: RepositoryScanner::new(api),
        }
    }

    /// Scans `repositories` in order and returns the first matching branch.
    ///
    /// A repository whose branch listing fails is skipped as if it had no
    /// branches, except for authentication failures which abort the scan.
    pub async fn find_match(
        &self,
        credential: &Credential,
        issue: &IssueReference,
        repositories: &[Repository],
    ) -> GitContextEngineResult<MatchOutcome> {
        if issue.identifier.trim().is_empty() {
            return Err(GitContextEngineError::Validation(
                "issue identifier is required".into(),
            ));
        }

        let patterns = candidate_patterns(issue);
        debug!(
            issue = %issue.identifier,
            patterns = patterns.len(),
            repositories = repositories.len(),
            "branch scan started"
        );

        for repository in repositories {
            let branches = match self.scanner.list_branches(credential, repository).await {
                Ok(b) => b,
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!(
                        repository = %repository.full_name,
                        error = %e,
                        "branch listing failed, skipping repository"
                    );
                    continue;
                }
            };

            if let Some(branch) = first_matching_branch(&branches, &patterns) {
                info!(
                    issue = %issue.identifier,
                    repository = %repository.full_name,
                    branch = %branch.name,
                    "matching branch found"
                );
                return Ok(MatchOutcome::Found(BranchMatch {
                    repository: repository.clone(),
                    branch: branch.clone(),
                }));
            }
        }

        info!(issue = %issue.identifier, "no matching branch found");
        Ok(MatchOutcome::NotFound(NoMatch {
            possible_branches: patterns,
            repositories: repositories.iter().map(|r| r.full_name.clone()).collect(),
        }))
    }
}
