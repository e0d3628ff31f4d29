use serde::Deserialize;

/// Query of `GET /project-context`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContextQuery {
    /// Repository as `owner/name`.
    pub github_url: Option<String>,
}

/// Body of `POST /project-context`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContextRequest {
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub force_refresh: bool,
}
