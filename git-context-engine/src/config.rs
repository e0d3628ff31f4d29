//! Engine configuration loaded from environment variables.
//!
//! # Environment variables
//!
//! - `GITHUB_API_BASE`      = REST base, default `https://api.github.com`
//! - `GITHUB_USER_AGENT`    = user agent, default `git-context-engine/0.1`
//! - `TREE_CONCURRENCY`     = directory fetches per batch, default `5`
//! - `DIFF_MAX_FILES`       = files kept in a diff context, default `5`
//! - `DIFF_MAX_PATCH_LINES` = patch lines kept per file, default `20`
//! - `CONTEXT_TTL_DAYS`     = project-context freshness window, default `7`
//! - `CONTEXT_CACHE_DIR`    = optional directory for JSON-file context storage

use std::path::PathBuf;

use chrono::Duration;

use crate::errors::{GitContextEngineConfigError, GitContextEngineResult};
use crate::formatter::FormatOptions;

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "git-context-engine/0.1";
pub const DEFAULT_TREE_CONCURRENCY: usize = 5;
pub const DEFAULT_CONTEXT_TTL_DAYS: i64 = 7;

/// Runtime configuration shared by the provider client and the engine components.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// API base, e.g. "https://api.github.com" or a GitHub Enterprise `/api/v3` root.
    pub github_api_base: String,
    pub user_agent: String,
    /// Maximum simultaneous directory listings during a recursive tree walk.
    pub tree_concurrency: usize,
    pub format: FormatOptions,
    pub context_ttl_days: i64,
    /// When set, project contexts are persisted as JSON files under this directory.
    pub context_cache_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            tree_concurrency: DEFAULT_TREE_CONCURRENCY,
            format: FormatOptions::default(),
            context_ttl_days: DEFAULT_CONTEXT_TTL_DAYS,
            context_cache_dir: None,
        }
    }
}

impl EngineConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> GitContextEngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> GitContextEngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let github_api_base = match get("GITHUB_API_BASE") {
            Some(url) => normalize_base_url(&url)?,
            None => defaults.github_api_base,
        };

        let tree_concurrency = match get("TREE_CONCURRENCY") {
            Some(raw) => parse_positive(&raw, "TREE_CONCURRENCY")?,
            None => defaults.tree_concurrency,
        };

        let max_files = match get("DIFF_MAX_FILES") {
            Some(raw) => parse_positive(&raw, "DIFF_MAX_FILES")?,
            None => defaults.format.max_files,
        };

        let max_patch_lines = match get("DIFF_MAX_PATCH_LINES") {
            Some(raw) => parse_positive(&raw, "DIFF_MAX_PATCH_LINES")?,
            None => defaults.format.max_patch_lines,
        };

        let context_ttl_days = match get("CONTEXT_TTL_DAYS") {
            Some(raw) => parse_positive(&raw, "CONTEXT_TTL_DAYS")? as i64,
            None => defaults.context_ttl_days,
        };

        Ok(Self {
            github_api_base,
            user_agent: get("GITHUB_USER_AGENT").unwrap_or(defaults.user_agent),
            tree_concurrency,
            format: FormatOptions {
                max_files,
                max_patch_lines,
            },
            context_ttl_days,
            context_cache_dir: get("CONTEXT_CACHE_DIR").map(PathBuf::from),
        })
    }

    /// Freshness window for cached project contexts.
    pub fn context_ttl(&self) -> Duration {
        Duration::days(self.context_ttl_days)
    }
}

/// Validates the scheme and strips trailing slashes so paths can be appended.
pub fn normalize_base_url(raw: &str) -> Result<String, GitContextEngineConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(GitContextEngineConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

fn parse_positive(raw: &str, var: &'static str) -> Result<usize, GitContextEngineConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(GitContextEngineConfigError::InvalidNumber {
            var,
            reason: "must be greater than zero",
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(GitContextEngineConfigError::InvalidNumber {
            var,
            reason: "expected a positive integer",
        }),
    }
}
