use serde::Deserialize;

/// Body of `POST /github/repository-content`.
#[derive(Debug, Deserialize)]
pub struct RepositoryContentRequest {
    #[serde(default)]
    pub repository: String,
    /// Repository-relative path; empty means the root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub recursive: bool,
}
