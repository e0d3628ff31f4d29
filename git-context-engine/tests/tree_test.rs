mod common;

use std::time::Duration;

use common::{FakeSourceControl, credential, dir_entry, file_entry};
use git_context_engine::git_providers::{ContentKind, ContentTree};
use git_context_engine::tree::ContentTreeFetcher;

const REPO: &str = "org/app";

fn top_level_names() -> Vec<String> {
    (0..12).map(|i| format!("d{i:02}")).collect()
}

/// Root with twelve directories, each holding one file.
fn twelve_dirs() -> FakeSourceControl {
    let names = top_level_names();
    let mut api = FakeSourceControl::new()
        .with_delay(Duration::from_millis(20))
        .with_dir(REPO, "", names.iter().map(|n| dir_entry(n)).collect());
    for n in &names {
        api = api.with_dir(REPO, n, vec![file_entry(&format!("{n}/mod.rs"))]);
    }
    api
}

fn dirs(tree: &ContentTree) -> &[git_context_engine::git_providers::ContentNode] {
    match tree {
        ContentTree::Directory(nodes) => nodes,
        ContentTree::File(_) => panic!("expected a directory"),
    }
}

#[tokio::test]
async fn twelve_directories_are_listed_in_batches_of_five() {
    let api = twelve_dirs();
    let tree = ContentTreeFetcher::new(&api, 5)
        .fetch_tree(&credential(), REPO, "", true)
        .await
        .unwrap();

    let names = top_level_names();
    let paths: Vec<&str> = names.iter().map(String::as_str).collect();
    assert_eq!(
        api.entry_counts(&paths),
        [1, 2, 3, 4, 5, 1, 2, 3, 4, 5, 1, 2]
    );
    assert_eq!(api.peak_in_flight(), 5);

    let nodes = dirs(&tree);
    assert_eq!(nodes.len(), 12);
    assert!(nodes.iter().all(|n| n.children.len() == 1));
    assert_eq!(nodes[11].children[0].path, "d11/mod.rs");
}

#[tokio::test]
async fn deeper_levels_respect_the_same_cap() {
    let mut api = FakeSourceControl::new()
        .with_delay(Duration::from_millis(10))
        .with_dir(REPO, "", vec![dir_entry("a"), dir_entry("b")]);
    api = api
        .with_dir(REPO, "a", (0..8).map(|i| dir_entry(&format!("a/s{i}"))).collect())
        .with_dir(REPO, "b", (0..4).map(|i| dir_entry(&format!("b/s{i}"))).collect());
    for i in 0..8 {
        api = api.with_dir(REPO, &format!("a/s{i}"), vec![file_entry(&format!("a/s{i}/x.txt"))]);
    }
    for i in 0..4 {
        api = api.with_dir(REPO, &format!("b/s{i}"), Vec::new());
    }

    let tree = ContentTreeFetcher::new(&api, 5)
        .fetch_tree(&credential(), REPO, "", true)
        .await
        .unwrap();

    assert!(api.peak_in_flight() <= 5);
    // root + 2 + 12 listings
    assert_eq!(api.calls().len(), 15);
    let nodes = dirs(&tree);
    assert_eq!(nodes[0].children.len(), 8);
    assert_eq!(nodes[0].children[7].children[0].name, "x.txt");
    assert_eq!(nodes[1].children.len(), 4);
}

#[tokio::test]
async fn failed_subdirectory_keeps_an_empty_child_list() {
    let api = FakeSourceControl::new()
        .with_dir(REPO, "", vec![dir_entry("ok"), dir_entry("locked"), file_entry("README.md")])
        .with_dir(REPO, "ok", vec![file_entry("ok/a.rs")])
        .with_failing_contents(REPO, "locked", 403);

    let tree = ContentTreeFetcher::new(&api, 5)
        .fetch_tree(&credential(), REPO, "", true)
        .await
        .unwrap();

    let nodes = dirs(&tree);
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].children.len(), 1);
    assert_eq!(nodes[1].kind, ContentKind::Dir);
    assert!(nodes[1].children.is_empty());
}

#[tokio::test]
async fn initial_listing_failure_propagates() {
    let api = FakeSourceControl::new();
    let err = ContentTreeFetcher::new(&api, 5)
        .fetch_tree(&credential(), REPO, "missing", true)
        .await
        .unwrap_err();
    assert_eq!(err.upstream_status(), Some(404));
}

#[tokio::test]
async fn non_recursive_lists_one_level() {
    let api = twelve_dirs();
    let tree = ContentTreeFetcher::new(&api, 5)
        .fetch_tree(&credential(), REPO, "", false)
        .await
        .unwrap();

    assert_eq!(api.calls(), ["contents:org/app:"]);
    assert!(dirs(&tree).iter().all(|n| n.children.is_empty()));
}

#[tokio::test]
async fn file_path_returns_decoded_file() {
    let api = FakeSourceControl::new().with_file(REPO, "README.md", "# App\n\nHello");
    let tree = ContentTreeFetcher::with_default_concurrency(&api)
        .fetch_tree(&credential(), REPO, "README.md", true)
        .await
        .unwrap();

    assert_eq!(tree.file_text(), Some("# App\n\nHello"));
    let ContentTree::File(node) = tree else {
        panic!("expected a file");
    };
    assert!(node.encoding.is_none());
}
