use git_context_engine::{
    config::EngineConfig,
    context::{FileContextStore, InMemoryContextStore, ProjectContextAssembler, ProjectContextRecord, ProjectContextStore},
    errors::GitContextEngineResult,
    git_providers::github::GitHubClient,
};
use tracing::info;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub config: EngineConfig,
    /// Holds no credential; each request brings its own.
    pub github: GitHubClient,
    pub contexts: ContextStore,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> GitContextEngineResult<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn new(config: EngineConfig) -> GitContextEngineResult<Self> {
        let github = GitHubClient::from_config(&config)?;
        let contexts = match &config.context_cache_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "project contexts persisted to disk");
                ContextStore::File(FileContextStore::new(dir))
            }
            None => ContextStore::Memory(InMemoryContextStore::new()),
        };
        Ok(Self {
            config,
            github,
            contexts,
        })
    }

    pub fn assembler(&self) -> ProjectContextAssembler<'_, GitHubClient, ContextStore> {
        ProjectContextAssembler::new(&self.github, &self.contexts)
            .with_tree_concurrency(self.config.tree_concurrency)
            .with_ttl(self.config.context_ttl())
    }
}

/// Project-context storage picked from configuration.
#[derive(Debug)]
pub enum ContextStore {
    Memory(InMemoryContextStore),
    File(FileContextStore),
}

impl ProjectContextStore for ContextStore {
    async fn get(&self, repository_url: &str) -> GitContextEngineResult<Option<ProjectContextRecord>> {
        match self {
            ContextStore::Memory(s) => s.get(repository_url).await,
            ContextStore::File(s) => s.get(repository_url).await,
        }
    }

    async fn put(&self, record: ProjectContextRecord) -> GitContextEngineResult<()> {
        match self {
            ContextStore::Memory(s) => s.put(record).await,
            ContextStore::File(s) => s.put(record).await,
        }
    }

    async fn list(&self) -> GitContextEngineResult<Vec<ProjectContextRecord>> {
        match self {
            ContextStore::Memory(s) => s.list().await,
            ContextStore::File(s) => s.list().await,
        }
    }
}
