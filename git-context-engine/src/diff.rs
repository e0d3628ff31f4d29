//! Branch comparison into a [`DiffSummary`].

use tracing::{debug, instrument};

use crate::errors::{GitContextEngineError, GitContextEngineResult};
use crate::git_providers::{Credential, DiffSummary, SourceControlApi};

/// Retrieves the file-level change-set between two branches of one repository.
#[derive(Debug)]
pub struct DiffFetcher<'a, A> {
    api: &'a A,
}

impl<'a, A: SourceControlApi> DiffFetcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Compares `base` (target/default) with `head` (source) in a single call.
    ///
    /// Upstream failures such as unrelated histories or a missing branch
    /// surface as `UpstreamError` with the upstream status.
    #[instrument(skip_all, fields(repository = %repository, base = %base, head = %head))]
    pub async fn compare(
        &self,
        credential: &Credential,
        repository: &str,
        base: &str,
        head: &str,
    ) -> GitContextEngineResult<DiffSummary> {
        let comparison = self.api.compare(credential, repository, base, head).await?;
        let summary = DiffSummary::new(
            repository,
            head,
            base,
            comparison.commits.len(),
            comparison.files,
        );
        debug!(
            commits = summary.totals.commits,
            files = summary.totals.changed_files,
            additions = summary.totals.additions,
            deletions = summary.totals.deletions,
            "comparison fetched"
        );
        Ok(summary)
    }

    /// Compares user-chosen branches after checking every input is present.
    pub async fn compare_custom(
        &self,
        credential: &Credential,
        repository: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> GitContextEngineResult<DiffSummary> {
        let missing: Vec<&str> = [
            ("repository", repository),
            ("sourceBranch", source_branch),
            ("targetBranch", target_branch),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();

        if !missing.is_empty() {
            return Err(GitContextEngineError::Validation(format!(
                "missing required parameters: {}",
                missing.join(", ")
            )));
        }

        self.compare(credential, repository, target_branch, source_branch)
            .await
    }
}
