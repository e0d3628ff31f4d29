//! Repository and branch enumeration with transparent pagination.

use tracing::debug;

use crate::errors::GitContextEngineResult;
use crate::git_providers::{Branch, Credential, PAGE_SIZE, Repository, SourceControlApi};

/// Lists an account's repositories and, per repository, its branches.
///
/// Pages of [`PAGE_SIZE`] are requested until a short page comes back, so
/// callers always see the full set. Errors propagate untouched; no retries.
#[derive(Debug)]
pub struct RepositoryScanner<'a, A> {
    api: &'a A,
}

impl<'a, A: SourceControlApi> RepositoryScanner<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Every repository accessible to the account, in upstream order.
    pub async fn list_repositories(
        &self,
        credential: &Credential,
    ) -> GitContextEngineResult<Vec<Repository>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .api
                .list_repositories_page(credential, page, PAGE_SIZE)
                .await?;
            let n = batch.len();
            all.extend(batch);
            debug!(page, count = n, "repositories page fetched");
            if n < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    /// Branches of `repository`: default branch first, then lexicographic.
    pub async fn list_branches(
        &self,
        credential: &Credential,
        repository: &Repository,
    ) -> GitContextEngineResult<Vec<Branch>> {
        let mut names = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .api
                .list_branch_names_page(credential, &repository.full_name, page, PAGE_SIZE)
                .await?;
            let n = batch.len();
            names.extend(batch);
            debug!(
                repository = %repository.full_name,
                page,
                count = n,
                "branches page fetched"
            );
            if n < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(order_branches(names, &repository.default_branch))
    }

    /// Branches of a repository known only by name; looks up its default branch first.
    pub async fn list_branches_by_name(
        &self,
        credential: &Credential,
        full_name: &str,
    ) -> GitContextEngineResult<Vec<Branch>> {
        let repository = self.api.get_repository(credential, full_name).await?;
        self.list_branches(credential, &repository).await
    }
}

/// Flags the default branch and sorts it first, the rest by name.
pub fn order_branches(names: Vec<String>, default_branch: &str) -> Vec<Branch> {
    let mut branches: Vec<Branch> = names
        .into_iter()
        .map(|name| Branch {
            is_default: name == default_branch,
            name,
        })
        .collect();
    branches.sort_by(|a, b| b.is_default.cmp(&a.is_default).then_with(|| a.name.cmp(&b.name)));
    branches
}
