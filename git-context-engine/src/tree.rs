//! Recursive repository tree materialization under a concurrency cap.
//!
//! Directories are expanded level by level. The pending directories of a level
//! are cut into batches of `concurrency`; each batch is listed concurrently and
//! fully awaited before the next batch starts, so at most `concurrency` listings
//! are ever in flight. A tree costs `ceil(dirs_at_level / concurrency)` rounds
//! per depth level.
//!
//! Listings are collected into a path-keyed table first and the tree is built
//! afterwards by a pure function, so concurrent branches never share a mutable
//! node.

use std::collections::{HashMap, HashSet};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::config::DEFAULT_TREE_CONCURRENCY;
use crate::errors::GitContextEngineResult;
use crate::git_providers::{
    ContentEntry, ContentKind, ContentListing, ContentNode, ContentTree, Credential,
    SourceControlApi,
};

#[derive(Debug)]
pub struct ContentTreeFetcher<'a, A> {
    api: &'a A,
    concurrency: usize,
}

impl<'a, A: SourceControlApi> ContentTreeFetcher<'a, A> {
    /// `concurrency` below one is raised to one.
    pub fn new(api: &'a A, concurrency: usize) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_default_concurrency(api: &'a A) -> Self {
        Self::new(api, DEFAULT_TREE_CONCURRENCY)
    }

    /// Lists `path` and, when `recursive`, every directory below it.
    ///
    /// A failure of the initial listing propagates. Failures while expanding
    /// subdirectories leave that directory with no children.
    #[instrument(skip_all, fields(repository = %repository, path = %path, recursive = recursive))]
    pub async fn fetch_tree(
        &self,
        credential: &Credential,
        repository: &str,
        path: &str,
        recursive: bool,
    ) -> GitContextEngineResult<ContentTree> {
        let entries = match self.api.get_contents(credential, repository, path).await? {
            ContentListing::File(entry) => {
                return Ok(ContentTree::File(into_node(entry, Vec::new())));
            }
            ContentListing::Directory(entries) => entries,
        };

        let listings = if recursive {
            self.expand_directories(credential, repository, &entries)
                .await
        } else {
            HashMap::new()
        };

        debug!(
            top_level = entries.len(),
            expanded_dirs = listings.len(),
            "tree fetched"
        );
        Ok(ContentTree::Directory(assemble(&entries, &listings)))
    }

    /// Breadth-first batched listing of every directory reachable from `root`.
    async fn expand_directories(
        &self,
        credential: &Credential,
        repository: &str,
        root: &[ContentEntry],
    ) -> HashMap<String, Vec<ContentEntry>> {
        let mut listings: HashMap<String, Vec<ContentEntry>> = HashMap::new();
        let mut scheduled: HashSet<String> = HashSet::new();
        let mut frontier = unscheduled_dirs(root, &mut scheduled);
        let mut depth = 0usize;

        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();

            for batch in frontier.chunks(self.concurrency) {
                debug!(depth, batch = batch.len(), "listing directory batch");
                let results = join_all(
                    batch
                        .iter()
                        .map(|dir| self.list_directory(credential, repository, dir)),
                )
                .await;

                for (dir, entries) in batch.iter().zip(results) {
                    next.extend(unscheduled_dirs(&entries, &mut scheduled));
                    listings.insert(dir.clone(), entries);
                }
            }

            frontier = next;
        }

        listings
    }

    async fn list_directory(
        &self,
        credential: &Credential,
        repository: &str,
        path: &str,
    ) -> Vec<ContentEntry> {
        match self.api.get_contents(credential, repository, path).await {
            Ok(ContentListing::Directory(entries)) => entries,
            Ok(ContentListing::File(_)) => {
                warn!(path, "directory listing returned a file, keeping it empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path, error = %e, "directory listing failed, keeping it empty");
                Vec::new()
            }
        }
    }
}

fn unscheduled_dirs(entries: &[ContentEntry], scheduled: &mut HashSet<String>) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.kind == ContentKind::Dir)
        .filter(|e| scheduled.insert(e.path.clone()))
        .map(|e| e.path.clone())
        .collect()
}

/// Builds nodes for `entries`, attaching listed children to directories.
pub fn assemble(
    entries: &[ContentEntry],
    listings: &HashMap<String, Vec<ContentEntry>>,
) -> Vec<ContentNode> {
    entries
        .iter()
        .map(|entry| {
            let children = match (entry.kind, listings.get(&entry.path)) {
                (ContentKind::Dir, Some(child_entries)) => assemble(child_entries, listings),
                _ => Vec::new(),
            };
            into_node(entry.clone(), children)
        })
        .collect()
}

fn into_node(entry: ContentEntry, children: Vec<ContentNode>) -> ContentNode {
    let (content, encoding) = decode_content(entry.kind, entry.content, entry.encoding);
    ContentNode {
        path: entry.path,
        name: entry.name,
        kind: entry.kind,
        size: entry.size,
        content,
        encoding,
        children,
    }
}

/// Decodes base64 file content to UTF-8 text and drops the encoding marker.
///
/// Content that is not base64, not a file, or not valid UTF-8 is returned as provided.
pub fn decode_content(
    kind: ContentKind,
    content: Option<String>,
    encoding: Option<String>,
) -> (Option<String>, Option<String>) {
    match (kind, content, encoding) {
        (ContentKind::File, Some(raw), Some(enc)) if enc == "base64" => {
            match decode_base64_text(&raw) {
                Some(text) => (Some(text), None),
                None => (Some(raw), Some(enc)),
            }
        }
        (_, content, encoding) => (content, encoding),
    }
}

/// GitHub wraps base64 payloads every 60 characters; whitespace is ignored.
pub fn decode_base64_text(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned).ok()?;
    String::from_utf8(bytes).ok()
}
