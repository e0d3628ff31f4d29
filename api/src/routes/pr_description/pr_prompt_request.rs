use git_context_engine::{formatter::DiffContext, git_providers::IssueReference};
use serde::Deserialize;

/// Body of `POST /pr-description/prompt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrPromptRequest {
    pub issue: IssueReference,
    #[serde(default)]
    pub diff_context: Option<DiffContext>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}
