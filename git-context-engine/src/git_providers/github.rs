//! GitHub provider (REST v3) for repositories, branches, comparisons and contents.
//!
//! Endpoints used (as of 2025):
//!   * GET /user/repos?per_page={n}&page={p}
//!   * GET /repos/{owner}/{repo}
//!   * GET /repos/{owner}/{repo}/branches?per_page={n}&page={p}
//!   * GET /repos/{owner}/{repo}/compare/{base}...{head}
//!   * GET /repos/{owner}/{repo}/contents/{path}

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::{GitContextEngineProviderError, GitContextEngineResult};
use crate::git_providers::types::*;
use crate::git_providers::{SourceControlApi, split_owner_repo};

const ACCEPT_JSON: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// GitHub HTTP client wrapper.
///
/// Holds no credential: the caller's token is passed into every call.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance.
    pub fn new(http: Client, base_api: impl Into<String>) -> Self {
        let base_api = base_api.into().trim_end_matches('/').to_string();
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self { http, base_api }
    }

    /// Builds the HTTP client with a stable user agent from engine config.
    pub fn from_config(cfg: &EngineConfig) -> GitContextEngineResult<Self> {
        let http = Client::builder().user_agent(cfg.user_agent.clone()).build()?;
        Ok(Self::new(http, cfg.github_api_base.clone()))
    }

    fn repo_url(&self, full_name: &str) -> GitContextEngineResult<String> {
        let (owner, repo) = split_owner_repo(full_name)?;
        Ok(format!(
            "{}/repos/{}/{}",
            self.base_api,
            urlencoding::encode(&owner),
            urlencoding::encode(&repo)
        ))
    }

    /// Authenticated GET returning decoded JSON, mapping non-2xx into typed errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        url: &str,
        query: &[(&str, String)],
    ) -> GitContextEngineResult<T> {
        let token = credential.token()?;
        debug!(url, ?query, "GitHub GET");

        let resp = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .header("Accept", ACCEPT_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(url, status = status.as_u16(), "GitHub non-success response");
            return Err(
                GitContextEngineProviderError::from_status(status.as_u16(), upstream_message(&body))
                    .into(),
            );
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            GitContextEngineProviderError::InvalidResponse(format!("{url}: {e}")).into()
        })
    }
}

impl SourceControlApi for GitHubClient {
    async fn list_repositories_page(
        &self,
        credential: &Credential,
        page: u32,
        per_page: u32,
    ) -> GitContextEngineResult<Vec<Repository>> {
        let url = format!("{}/user/repos", self.base_api);
        let raw: Vec<GitHubRepo> = self
            .get_json(
                credential,
                &url,
                &[("per_page", per_page.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(raw.into_iter().map(Repository::from).collect())
    }

    async fn get_repository(
        &self,
        credential: &Credential,
        full_name: &str,
    ) -> GitContextEngineResult<Repository> {
        let url = self.repo_url(full_name)?;
        let raw: GitHubRepo = self.get_json(credential, &url, &[]).await?;
        Ok(raw.into())
    }

    async fn list_branch_names_page(
        &self,
        credential: &Credential,
        full_name: &str,
        page: u32,
        per_page: u32,
    ) -> GitContextEngineResult<Vec<String>> {
        let url = format!("{}/branches", self.repo_url(full_name)?);
        let raw: Vec<GitHubBranch> = self
            .get_json(
                credential,
                &url,
                &[("per_page", per_page.to_string()), ("page", page.to_string())],
            )
            .await?;
        Ok(raw.into_iter().map(|b| b.name).collect())
    }

    async fn compare(
        &self,
        credential: &Credential,
        full_name: &str,
        base: &str,
        head: &str,
    ) -> GitContextEngineResult<Comparison> {
        let url = format!(
            "{}/compare/{}...{}",
            self.repo_url(full_name)?,
            encode_ref(base),
            encode_ref(head)
        );
        let raw: GitHubCompare = self.get_json(credential, &url, &[]).await?;

        let commits = raw
            .commits
            .into_iter()
            .map(|c| ComparisonCommit {
                sha: c.sha,
                message: c.commit.message,
            })
            .collect();

        let files = raw
            .files
            .into_iter()
            .map(|f| FileChange {
                filename: f.filename,
                status: f.status,
                additions: f.additions,
                deletions: f.deletions,
                patch: f.patch,
                previous_filename: f.previous_filename,
            })
            .collect();

        Ok(Comparison { commits, files })
    }

    async fn get_contents(
        &self,
        credential: &Credential,
        full_name: &str,
        path: &str,
    ) -> GitContextEngineResult<ContentListing> {
        let url = format!("{}/contents/{}", self.repo_url(full_name)?, encode_path(path));
        let raw: GitHubContents = self.get_json(credential, &url, &[]).await?;
        Ok(match raw {
            GitHubContents::Many(items) => ContentListing::Directory(items),
            GitHubContents::One(item) => ContentListing::File(item),
        })
    }
}

/// Percent-encodes a ref while keeping `/` separators (`feature/abc-1`).
fn encode_ref(git_ref: &str) -> String {
    urlencoding::encode(git_ref).replace("%2F", "/")
}

/// Percent-encodes each segment of a repository-relative path.
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extracts GitHub's `message` field from an error body, falling back to raw text.
fn upstream_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(b) => b.message,
        Err(_) => body.chars().take(200).collect(),
    }
}

/// GitHub repository response (subset).
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    id: u64,
    name: String,
    full_name: String,
    #[serde(default)]
    default_branch: Option<String>,
}

impl From<GitHubRepo> for Repository {
    fn from(r: GitHubRepo) -> Self {
        Repository {
            id: r.id,
            name: r.name,
            full_name: r.full_name,
            // empty repositories report no default branch
            default_branch: r.default_branch.unwrap_or_else(|| "main".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubBranch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCompare {
    #[serde(default)]
    commits: Vec<GitHubCompareCommit>,
    #[serde(default)]
    files: Vec<GitHubCompareFile>,
}

#[derive(Debug, Deserialize)]
struct GitHubCompareCommit {
    sha: String,
    commit: GitHubCommitInner,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitInner {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCompareFile {
    filename: String,
    status: FileStatus,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    patch: Option<String>,
    #[serde(default)]
    previous_filename: Option<String>,
}

/// `/contents` answers with an array for directories and an object for files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitHubContents {
    Many(Vec<ContentEntry>),
    One(ContentEntry),
}
