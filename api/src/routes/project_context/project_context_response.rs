use git_context_engine::context::ProjectContextRecord;
use serde::Serialize;

/// Stored record plus its freshness at response time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContextResponse {
    #[serde(flatten)]
    pub record: ProjectContextRecord,
    pub is_fresh: bool,
}
