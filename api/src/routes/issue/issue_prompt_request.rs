use serde::Deserialize;

/// Body of `POST /issue/prompt`.
///
/// `projectContext` wins over `githubUrl`; the latter pulls the cached
/// document for that repository when one exists.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePromptRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub project_context: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}
