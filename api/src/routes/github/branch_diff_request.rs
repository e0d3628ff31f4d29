use git_context_engine::git_providers::IssueReference;
use serde::Deserialize;

/// Body of `POST /github/branch-diff`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDiffRequest {
    #[serde(default)]
    pub issue_identifier: String,
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_description: Option<String>,
}

impl BranchDiffRequest {
    pub fn into_issue(self) -> IssueReference {
        IssueReference {
            description: self.issue_description,
            ..IssueReference::new(self.issue_identifier, self.issue_title.unwrap_or_default())
        }
    }
}
