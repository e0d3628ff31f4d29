use serde::Deserialize;

/// Query of `GET /github/branches`.
#[derive(Debug, Deserialize)]
pub struct BranchesRequest {
    /// Repository as `owner/name`.
    pub repository: Option<String>,
}
