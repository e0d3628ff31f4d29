//! In-memory `SourceControlApi` double shared by the integration tests.
//!
//! Records every call and tracks how many `get_contents` calls are in flight,
//! so tests can assert both ordering and the concurrency cap.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use git_context_engine::errors::{GitContextEngineProviderError, GitContextEngineResult};
use git_context_engine::git_providers::{
    Comparison, ComparisonCommit, ContentEntry, ContentKind, ContentListing, Credential,
    FileChange, FileStatus, Repository, SourceControlApi,
};

pub fn credential() -> Credential {
    Credential::bearer("gho_test_token")
}

pub fn repository(full_name: &str, default_branch: &str) -> Repository {
    Repository {
        id: full_name.len() as u64,
        name: full_name.rsplit('/').next().unwrap_or(full_name).to_string(),
        full_name: full_name.to_string(),
        default_branch: default_branch.to_string(),
    }
}

pub fn dir_entry(path: &str) -> ContentEntry {
    entry(path, ContentKind::Dir, None)
}

pub fn file_entry(path: &str) -> ContentEntry {
    entry(path, ContentKind::File, None)
}

fn entry(path: &str, kind: ContentKind, content: Option<String>) -> ContentEntry {
    ContentEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        kind,
        size: content.as_ref().map(|c| c.len() as u64).unwrap_or(0),
        encoding: content.as_ref().map(|_| "base64".to_string()),
        content,
    }
}

pub fn change(filename: &str, patch: Option<&str>) -> FileChange {
    FileChange {
        filename: filename.to_string(),
        status: FileStatus::Modified,
        additions: 3,
        deletions: 1,
        patch: patch.map(str::to_string),
        previous_filename: None,
    }
}

pub fn commits(n: usize) -> Vec<ComparisonCommit> {
    (0..n)
        .map(|i| ComparisonCommit {
            sha: format!("{i:040x}"),
            message: format!("commit {i}"),
        })
        .collect()
}

#[derive(Default)]
pub struct FakeSourceControl {
    repositories: Vec<Repository>,
    branches: HashMap<String, Vec<String>>,
    branch_failures: HashMap<String, u16>,
    comparisons: HashMap<(String, String, String), Comparison>,
    contents: HashMap<(String, String), ContentListing>,
    content_failures: HashMap<(String, String), u16>,
    delay: Duration,

    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    /// `(path, in-flight count right after the call started)`.
    entries: Mutex<Vec<(String, usize)>>,
}

impl FakeSourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, full_name: &str, default_branch: &str, branches: &[&str]) -> Self {
        self.repositories.push(repository(full_name, default_branch));
        self.branches.insert(
            full_name.to_string(),
            branches.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    pub fn with_failing_branches(mut self, full_name: &str, status: u16) -> Self {
        self.branch_failures.insert(full_name.to_string(), status);
        self
    }

    pub fn with_comparison(mut self, full_name: &str, base: &str, head: &str, comparison: Comparison) -> Self {
        self.comparisons.insert(
            (full_name.to_string(), base.to_string(), head.to_string()),
            comparison,
        );
        self
    }

    pub fn with_dir(mut self, full_name: &str, path: &str, entries: Vec<ContentEntry>) -> Self {
        self.contents.insert(
            (full_name.to_string(), path.to_string()),
            ContentListing::Directory(entries),
        );
        self
    }

    /// Registers a file served base64-encoded, the way GitHub returns it.
    pub fn with_file(mut self, full_name: &str, path: &str, text: &str) -> Self {
        let encoded = STANDARD.encode(text);
        self.contents.insert(
            (full_name.to_string(), path.to_string()),
            ContentListing::File(entry(path, ContentKind::File, Some(encoded))),
        );
        self
    }

    pub fn with_failing_contents(mut self, full_name: &str, path: &str, status: u16) -> Self {
        self.content_failures
            .insert((full_name.to_string(), path.to_string()), status);
        self
    }

    /// Latency of every `get_contents` call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// In-flight counts observed when the listed paths started, in start order.
    pub fn entry_counts(&self, paths: &[&str]) -> Vec<usize> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| paths.contains(&p.as_str()))
            .map(|(_, n)| *n)
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn upstream<T>(status: u16) -> GitContextEngineResult<T> {
    Err(GitContextEngineProviderError::from_status(status, "fake failure").into())
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SourceControlApi for FakeSourceControl {
    async fn list_repositories_page(
        &self,
        credential: &Credential,
        page: u32,
        per_page: u32,
    ) -> GitContextEngineResult<Vec<Repository>> {
        credential.token()?;
        self.record(format!("repos:{page}"));
        let start = ((page - 1) * per_page) as usize;
        Ok(self
            .repositories
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_repository(
        &self,
        credential: &Credential,
        full_name: &str,
    ) -> GitContextEngineResult<Repository> {
        credential.token()?;
        self.record(format!("repo:{full_name}"));
        match self.repositories.iter().find(|r| r.full_name == full_name) {
            Some(r) => Ok(r.clone()),
            None => upstream(404),
        }
    }

    async fn list_branch_names_page(
        &self,
        credential: &Credential,
        full_name: &str,
        page: u32,
        per_page: u32,
    ) -> GitContextEngineResult<Vec<String>> {
        credential.token()?;
        self.record(format!("branches:{full_name}:{page}"));
        if let Some(status) = self.branch_failures.get(full_name) {
            return upstream(*status);
        }
        let start = ((page - 1) * per_page) as usize;
        Ok(self
            .branches
            .get(full_name)
            .map(|all| all.iter().skip(start).take(per_page as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn compare(
        &self,
        credential: &Credential,
        full_name: &str,
        base: &str,
        head: &str,
    ) -> GitContextEngineResult<Comparison> {
        credential.token()?;
        self.record(format!("compare:{full_name}:{base}...{head}"));
        let key = (full_name.to_string(), base.to_string(), head.to_string());
        match self.comparisons.get(&key) {
            Some(c) => Ok(c.clone()),
            None => upstream(404),
        }
    }

    async fn get_contents(
        &self,
        credential: &Credential,
        full_name: &str,
        path: &str,
    ) -> GitContextEngineResult<ContentListing> {
        credential.token()?;
        self.record(format!("contents:{full_name}:{path}"));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.entries.lock().unwrap().push((path.to_string(), now));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let key = (full_name.to_string(), path.to_string());
        if let Some(status) = self.content_failures.get(&key) {
            return upstream(*status);
        }
        match self.contents.get(&key) {
            Some(listing) => Ok(listing.clone()),
            None => upstream(404),
        }
    }
}
