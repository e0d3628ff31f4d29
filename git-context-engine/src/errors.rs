//! Crate-wide error hierarchy for git-context-engine.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitContextEngineResult<T> = Result<T, GitContextEngineError>;

/// Root error type for the git-context-engine crate.
#[derive(Debug, Error)]
pub enum GitContextEngineError {
    /// Source-control provider failure (auth, non-2xx, transport).
    #[error(transparent)]
    Provider(#[from] GitContextEngineProviderError),

    /// Project-context store failure (file I/O / JSON).
    #[error(transparent)]
    Cache(#[from] GitContextEngineCacheError),

    /// Configuration problems (bad base URL, invalid numbers, etc.).
    #[error(transparent)]
    Config(#[from] GitContextEngineConfigError),

    /// Expected absence: no cached context, no such file at a path.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed required input (issue identifier, repository name).
    #[error("validation error: {0}")]
    Validation(String),
}

impl GitContextEngineError {
    /// True when the caller must reconnect the source-control account.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            GitContextEngineError::Provider(GitContextEngineProviderError::Auth)
        )
    }

    /// True for expected absences, including an upstream 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            GitContextEngineError::NotFound(_) => true,
            other => other.upstream_status() == Some(404),
        }
    }

    /// Upstream HTTP status carried by an `UpstreamError`, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            GitContextEngineError::Provider(GitContextEngineProviderError::Upstream {
                status,
                ..
            }) => Some(*status),
            _ => None,
        }
    }
}

/// Provider-specific error used inside the provider layer.
///
/// Nothing in this crate retries on these; retry policy belongs to whatever
/// wraps the transport.
#[derive(Debug, Error)]
pub enum GitContextEngineProviderError {
    /// Missing, empty or rejected (HTTP 401) credential.
    #[error("source-control authentication required: reconnect the account")]
    Auth,

    /// Any other non-2xx response.
    #[error("upstream error: status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Project-context store errors.
#[derive(Debug, Error)]
pub enum GitContextEngineCacheError {
    /// I/O error while reading or writing cache files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error in cache payloads.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum GitContextEngineConfigError {
    /// A required variable is absent.
    #[error("missing configuration variable: {0}")]
    MissingVar(&'static str),

    /// A numeric variable failed to parse or is out of range.
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Invalid base API URL.
    #[error("invalid base api url: {0}")]
    InvalidBaseUrl(String),
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for GitContextEngineError {
    fn from(e: reqwest::Error) -> Self {
        GitContextEngineError::Provider(GitContextEngineProviderError::from(e))
    }
}

impl From<std::io::Error> for GitContextEngineError {
    fn from(e: std::io::Error) -> Self {
        GitContextEngineError::Cache(GitContextEngineCacheError::Io(e))
    }
}

impl From<serde_json::Error> for GitContextEngineError {
    fn from(e: serde_json::Error) -> Self {
        GitContextEngineError::Cache(GitContextEngineCacheError::Serde(e))
    }
}

// ===== Mapping from reqwest::Error into GitContextEngineProviderError =====

impl From<reqwest::Error> for GitContextEngineProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GitContextEngineProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            return GitContextEngineProviderError::from_status(status.as_u16(), e.to_string());
        }

        if e.is_decode() {
            return GitContextEngineProviderError::InvalidResponse(e.to_string());
        }

        GitContextEngineProviderError::Network(e.to_string())
    }
}

impl GitContextEngineProviderError {
    /// Classifies a non-2xx status: 401 is an auth failure, the rest keep their code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => GitContextEngineProviderError::Auth,
            _ => GitContextEngineProviderError::Upstream {
                status,
                message: message.into(),
            },
        }
    }
}
