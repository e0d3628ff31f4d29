use serde::Deserialize;

/// Body of `POST /github/custom-diff`; missing fields are reported together.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDiffRequest {
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub source_branch: String,
    #[serde(default)]
    pub target_branch: String,
}

impl CustomDiffRequest {
    /// Camel-case names of the fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("repository", &self.repository),
            ("sourceBranch", &self.source_branch),
            ("targetBranch", &self.target_branch),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }
}
