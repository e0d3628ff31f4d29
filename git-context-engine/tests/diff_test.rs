mod common;

use common::{FakeSourceControl, change, commits, credential};
use git_context_engine::diff::DiffFetcher;
use git_context_engine::errors::GitContextEngineError;
use git_context_engine::git_providers::Comparison;
use git_context_engine::scanner::RepositoryScanner;

fn fake() -> FakeSourceControl {
    FakeSourceControl::new()
        .with_repository("org/app", "main", &["release", "main", "dev"])
        .with_comparison(
            "org/app",
            "main",
            "dev",
            Comparison {
                commits: commits(3),
                files: vec![
                    change("a.rs", Some("+a")),
                    change("logo.png", None),
                    change("b.rs", Some("+b")),
                ],
            },
        )
}

#[tokio::test]
async fn custom_compare_targets_base_with_source_as_head() {
    let api = fake();
    let summary = DiffFetcher::new(&api)
        .compare_custom(&credential(), "org/app", "dev", "main")
        .await
        .unwrap();

    assert_eq!(api.calls(), ["compare:org/app:main...dev"]);
    assert_eq!(summary.source_branch, "dev");
    assert_eq!(summary.target_branch, "main");
    assert_eq!(summary.totals.commits, 3);
    assert_eq!(summary.totals.changed_files, 3);
    assert_eq!(summary.totals.additions, 9);
    assert_eq!(summary.totals.deletions, 3);
    // comparison order is kept
    let names: Vec<_> = summary.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, ["a.rs", "logo.png", "b.rs"]);
}

#[tokio::test]
async fn custom_compare_lists_every_missing_parameter() {
    let api = fake();
    let err = DiffFetcher::new(&api)
        .compare_custom(&credential(), "", "dev", " ")
        .await
        .unwrap_err();

    let GitContextEngineError::Validation(message) = err else {
        panic!("expected a validation error");
    };
    assert!(message.contains("repository"));
    assert!(message.contains("targetBranch"));
    assert!(!message.contains("sourceBranch"));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn upstream_failure_keeps_its_status() {
    let api = fake();
    let err = DiffFetcher::new(&api)
        .compare(&credential(), "org/app", "main", "gone")
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(404));
}

#[tokio::test]
async fn branches_by_name_put_default_first() {
    let api = fake();
    let branches = RepositoryScanner::new(&api)
        .list_branches_by_name(&credential(), "org/app")
        .await
        .unwrap();

    let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["main", "dev", "release"]);
    assert!(branches[0].is_default);
    assert!(branches[1..].iter().all(|b| !b.is_default));
    assert_eq!(api.calls(), ["repo:org/app", "branches:org/app:1"]);
}
