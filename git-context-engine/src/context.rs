//! Project-context documents: tree + README + one metadata file, cached by age.
//!
//! Per repository the lifecycle is `absent → building → ready`. A ready record
//! younger than the freshness window is served as-is unless a refresh is
//! forced; anything else is rebuilt and replaces the stored record
//! (last writer wins, no single-flight between concurrent callers).

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::{DEFAULT_CONTEXT_TTL_DAYS, DEFAULT_TREE_CONCURRENCY};
use crate::errors::{GitContextEngineError, GitContextEngineResult};
use crate::git_providers::{ContentKind, ContentNode, ContentTree, Credential, SourceControlApi, split_owner_repo};
use crate::tree::ContentTreeFetcher;

pub const README_FILE: &str = "README.md";

/// Metadata files per ecosystem, scanned in this order; the first hit wins.
pub const METADATA_FILE_GROUPS: [(&str, &[&str]); 5] = [
    ("javascript", &["package.json", "tsconfig.json", "next.config.js"]),
    ("python", &["requirements.txt", "setup.py", "pyproject.toml"]),
    ("rust", &["Cargo.toml"]),
    ("go", &["go.mod", "go.sum"]),
    ("java", &["pom.xml", "build.gradle"]),
];

/// Cached project-context document keyed by repository.
///
/// Freshness is derived from `updated_at`, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContextRecord {
    /// Unique key; the repository's `owner/name`.
    pub repository_url: String,
    pub project_context: String,
    pub metadata_file_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectContextRecord {
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.updated_at < ttl
    }
}

/// Get/put contract of the persistence layer holding context records.
pub trait ProjectContextStore: Send + Sync {
    fn get(
        &self,
        repository_url: &str,
    ) -> impl Future<Output = GitContextEngineResult<Option<ProjectContextRecord>>> + Send;

    /// Inserts or replaces the record under its key.
    fn put(
        &self,
        record: ProjectContextRecord,
    ) -> impl Future<Output = GitContextEngineResult<()>> + Send;

    /// All records, most recently updated first.
    fn list(&self) -> impl Future<Output = GitContextEngineResult<Vec<ProjectContextRecord>>> + Send;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    records: RwLock<HashMap<String, ProjectContextRecord>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectContextStore for InMemoryContextStore {
    async fn get(&self, repository_url: &str) -> GitContextEngineResult<Option<ProjectContextRecord>> {
        Ok(self.records.read().await.get(repository_url).cloned())
    }

    async fn put(&self, record: ProjectContextRecord) -> GitContextEngineResult<()> {
        self.records
            .write()
            .await
            .insert(record.repository_url.clone(), record);
        Ok(())
    }

    async fn list(&self) -> GitContextEngineResult<Vec<ProjectContextRecord>> {
        let mut all: Vec<_> = self.records.read().await.values().cloned().collect();
        sort_recent_first(&mut all);
        Ok(all)
    }
}

/// JSON-file store: one file per repository under `root`.
///
/// Layout: `<root>/<owner_name>-<hash12>.json`, hash = SHA256(repository_url).
#[derive(Debug, Clone)]
pub struct FileContextStore {
    root: PathBuf,
}

impl FileContextStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, repository_url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(repository_url.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        self.root.join(format!(
            "{}-{}.json",
            sanitize(repository_url),
            &digest[..12]
        ))
    }
}

/// Filesystem-safe replacement for a repository name.
fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

impl ProjectContextStore for FileContextStore {
    async fn get(&self, repository_url: &str) -> GitContextEngineResult<Option<ProjectContextRecord>> {
        let path = self.key_path(repository_url);
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let data = fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    async fn put(&self, record: ProjectContextRecord) -> GitContextEngineResult<()> {
        fs::create_dir_all(&self.root).await?;
        let path = self.key_path(&record.repository_url);
        let json = serde_json::to_vec_pretty(&record)?;
        // Readers only ever see a complete file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn list(&self) -> GitContextEngineResult<Vec<ProjectContextRecord>> {
        if !fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }
        let mut all: Vec<ProjectContextRecord> = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read(&path).await?;
            match serde_json::from_slice(&data) {
                Ok(record) => all.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable context record"),
            }
        }
        sort_recent_first(&mut all);
        Ok(all)
    }
}

fn sort_recent_first(records: &mut [ProjectContextRecord]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Builds or serves the project-context document of a repository.
#[derive(Debug)]
pub struct ProjectContextAssembler<'a, A, S> {
    api: &'a A,
    store: &'a S,
    tree_concurrency: usize,
    ttl: Duration,
}

impl<'a, A: SourceControlApi, S: ProjectContextStore> ProjectContextAssembler<'a, A, S> {
    pub fn new(api: &'a A, store: &'a S) -> Self {
        Self {
            api,
            store,
            tree_concurrency: DEFAULT_TREE_CONCURRENCY,
            ttl: Duration::days(DEFAULT_CONTEXT_TTL_DAYS),
        }
    }

    pub fn with_tree_concurrency(mut self, concurrency: usize) -> Self {
        self.tree_concurrency = concurrency;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Stored record or `NotFoundError` when nothing is cached.
    pub async fn get_cached(&self, repository: &str) -> GitContextEngineResult<ProjectContextRecord> {
        self.store.get(repository).await?.ok_or_else(|| {
            GitContextEngineError::NotFound(format!("project context for {repository}"))
        })
    }

    pub fn is_fresh(&self, record: &ProjectContextRecord) -> bool {
        record.is_fresh_at(Utc::now(), self.ttl)
    }

    pub async fn get_or_build(
        &self,
        credential: &Credential,
        repository: &str,
        force_refresh: bool,
    ) -> GitContextEngineResult<ProjectContextRecord> {
        self.get_or_build_at(credential, repository, force_refresh, Utc::now())
            .await
    }

    /// Same as [`Self::get_or_build`] with an explicit clock.
    #[instrument(skip(self, credential, now))]
    pub async fn get_or_build_at(
        &self,
        credential: &Credential,
        repository: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> GitContextEngineResult<ProjectContextRecord> {
        split_owner_repo(repository)?;

        let prior = self.store.get(repository).await?;
        if let Some(record) = &prior {
            if !force_refresh && record.is_fresh_at(now, self.ttl) {
                debug!("serving fresh cached context");
                return Ok(record.clone());
            }
        }

        info!(stale_or_absent = prior.is_some(), "building project context");
        let fetcher = ContentTreeFetcher::new(self.api, self.tree_concurrency);

        let tree = fetcher.fetch_tree(credential, repository, "", true).await?;
        let readme = self.fetch_text_file(&fetcher, credential, repository, README_FILE).await?;

        let known_metadata = if force_refresh {
            None
        } else {
            prior.as_ref().and_then(|r| r.metadata_file_type.clone())
        };
        let metadata = match known_metadata {
            Some(file) => {
                debug!(file = %file, "re-fetching known metadata file");
                self.fetch_text_file(&fetcher, credential, repository, &file)
                    .await?
                    .map(|content| (file, content))
            }
            None => self.detect_metadata_file(&fetcher, credential, repository).await?,
        };

        let document = render_project_context(
            repository,
            &tree,
            readme.as_deref(),
            metadata.as_ref().map(|(f, c)| (f.as_str(), c.as_str())),
        );

        let record = ProjectContextRecord {
            repository_url: repository.to_string(),
            project_context: document,
            metadata_file_type: metadata.map(|(file, _)| file),
            created_at: prior.as_ref().map(|r| r.created_at).unwrap_or(now),
            updated_at: now,
        };
        self.store.put(record.clone()).await?;

        info!(
            metadata = ?record.metadata_file_type,
            bytes = record.project_context.len(),
            "project context stored"
        );
        Ok(record)
    }

    /// Scans [`METADATA_FILE_GROUPS`] in order and stops at the first file found.
    async fn detect_metadata_file(
        &self,
        fetcher: &ContentTreeFetcher<'a, A>,
        credential: &Credential,
        repository: &str,
    ) -> GitContextEngineResult<Option<(String, String)>> {
        for (ecosystem, files) in METADATA_FILE_GROUPS {
            for file in files {
                if let Some(content) = self.fetch_text_file(fetcher, credential, repository, file).await? {
                    debug!(ecosystem, file, "metadata file found");
                    return Ok(Some((file.to_string(), content)));
                }
            }
        }
        Ok(None)
    }

    /// Decoded, non-empty text of a file; `None` when absent (404) or not text.
    async fn fetch_text_file(
        &self,
        fetcher: &ContentTreeFetcher<'a, A>,
        credential: &Credential,
        repository: &str,
        path: &str,
    ) -> GitContextEngineResult<Option<String>> {
        match fetcher.fetch_tree(credential, repository, path, false).await {
            Ok(tree) => Ok(tree
                .file_text()
                .filter(|text| !text.is_empty())
                .map(str::to_string)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Markdown document: file tree, README and the metadata file.
pub fn render_project_context(
    repository: &str,
    tree: &ContentTree,
    readme: Option<&str>,
    metadata: Option<(&str, &str)>,
) -> String {
    let mut s = format!("# Project Context: {repository}\n\n");

    s.push_str("## File Structure\n\n```\n");
    if let ContentTree::Directory(nodes) = tree {
        render_tree(nodes, 0, &mut s);
    }
    s.push_str("```\n\n");

    if let Some(readme) = readme.filter(|r| !r.is_empty()) {
        s.push_str(&format!("## README\n\n{readme}\n\n"));
    }

    if let Some((file, content)) = metadata {
        s.push_str("## Project Dependencies and Configuration\n\n");
        s.push_str(&format!("### {file}\n\n```\n{content}\n```\n\n"));
    }

    s
}

/// Indented bullet list; symlinks and submodules are left out.
fn render_tree(nodes: &[ContentNode], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node.kind {
            ContentKind::Dir => {
                out.push_str(&format!("{indent}- 📁 {}/\n", node.name));
                render_tree(&node.children, depth + 1, out);
            }
            ContentKind::File => out.push_str(&format!("{indent}- 📄 {}\n", node.name)),
            ContentKind::Symlink | ContentKind::Submodule => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, kind: ContentKind, children: Vec<ContentNode>) -> ContentNode {
        ContentNode {
            path: name.to_string(),
            name: name.to_string(),
            kind,
            size: 0,
            content: None,
            encoding: None,
            children,
        }
    }

    fn record(updated_at: DateTime<Utc>) -> ProjectContextRecord {
        ProjectContextRecord {
            repository_url: "org/app".into(),
            project_context: "# Project Context: org/app".into(),
            metadata_file_type: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn freshness_window_is_exclusive() {
        let now = Utc::now();
        let ttl = Duration::days(7);
        assert!(record(now - Duration::days(6)).is_fresh_at(now, ttl));
        assert!(!record(now - Duration::days(7)).is_fresh_at(now, ttl));
        assert!(!record(now - Duration::days(30)).is_fresh_at(now, ttl));
    }

    #[test]
    fn tree_renders_as_indented_bullets() {
        let tree = ContentTree::Directory(vec![
            node(
                "src",
                ContentKind::Dir,
                vec![node("main.rs", ContentKind::File, Vec::new())],
            ),
            node("vendor", ContentKind::Submodule, Vec::new()),
            node("README.md", ContentKind::File, Vec::new()),
        ]);
        let doc = render_project_context("org/app", &tree, None, None);
        assert!(doc.starts_with("# Project Context: org/app\n\n## File Structure\n\n```\n"));
        assert!(doc.contains("- 📁 src/\n  - 📄 main.rs\n- 📄 README.md\n```\n"));
        assert!(!doc.contains("vendor"));
        assert!(!doc.contains("## README"));
    }

    #[test]
    fn readme_and_metadata_sections_follow_tree() {
        let tree = ContentTree::Directory(Vec::new());
        let doc = render_project_context(
            "org/app",
            &tree,
            Some("Hello"),
            Some(("Cargo.toml", "[package]")),
        );
        let readme_at = doc.find("## README\n\nHello").unwrap();
        let meta_at = doc
            .find("## Project Dependencies and Configuration\n\n### Cargo.toml\n\n```\n[package]\n```")
            .unwrap();
        assert!(readme_at < meta_at);
    }

    #[tokio::test]
    async fn in_memory_store_lists_most_recent_first() {
        let store = InMemoryContextStore::new();
        let now = Utc::now();
        let mut old = record(now - Duration::days(3));
        old.repository_url = "org/old".into();
        store.put(old).await.unwrap();
        store.put(record(now)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].repository_url, "org/app");
        assert_eq!(listed[1].repository_url, "org/old");
    }

    #[tokio::test]
    async fn file_store_round_trips_and_replaces() {
        let dir = std::env::temp_dir().join(format!(
            "git-context-engine-store-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = FileContextStore::new(&dir);
        assert!(store.get("org/app").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());

        let now = Utc::now();
        store.put(record(now - Duration::days(1))).await.unwrap();
        let mut newer = record(now);
        newer.project_context = "replaced".into();
        store.put(newer.clone()).await.unwrap();

        assert_eq!(store.get("org/app").await.unwrap(), Some(newer));
        assert_eq!(store.list().await.unwrap().len(), 1);

        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn file_store_list_skips_corrupt_records() {
        let dir = std::env::temp_dir().join(format!(
            "git-context-engine-corrupt-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = FileContextStore::new(&dir);
        store.put(record(Utc::now())).await.unwrap();
        std::fs::write(dir.join("stray.json"), "{ half written").unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].repository_url, "org/app");
        assert!(store.get("org/app").await.unwrap().is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
