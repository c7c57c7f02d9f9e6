//! Configuration management for toolrag.
//!
//! Configuration is layered, later layers winning:
//! 1. Built-in defaults
//! 2. YAML file (`.toolrag/config.yaml` in the workspace, or `TOOLRAG_CONFIG`)
//! 3. Environment variables
//! 4. Command-line flags (applied through [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Providers that speak the OpenAI-compatible chat/embeddings protocol.
pub const GATEWAY_PROVIDERS: [&str; 3] = ["litellm", "openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.toolrag/`)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// API key override (takes precedence over `gateway.api_key_env`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    pub gateway: GatewayConfig,
    pub generation: GenerationConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
}

/// Model gateway connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Provider name: "litellm", "openai", "ollama"
    pub provider: String,

    /// Base URL of the gateway (no trailing slash needed)
    pub base_url: String,

    /// Path of the chat completions endpoint
    pub chat_path: String,

    /// Path of the embeddings endpoint
    pub embeddings_path: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: "litellm".to_string(),
            base_url: "http://localhost:4000".to_string(),
            chat_path: "/v1/chat/completions".to_string(),
            embeddings_path: "/v1/embeddings".to_string(),
            api_key_env: "TOOLRAG_API_KEY".to_string(),
            timeout_secs: Some(60),
        }
    }
}

/// Generation parameters sent with every chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 512,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// "gateway" (uses the gateway section) or "mock"
    pub provider: String,

    pub model: String,

    /// Expected vector length. When unset, the index adopts the length of
    /// the first stored vector.
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "gateway".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
        }
    }
}

/// Chunker window settings, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

/// Vector index backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// SQLite file under the workspace
    Sqlite,
}

impl IndexBackend {
    /// Parse a backend name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Some(Self::Memory),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    pub backend: IndexBackend,

    /// SQLite file; relative paths resolve against `.toolrag/`
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Memory,
            path: PathBuf::from("index.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalConfig {
    /// Default number of results for searches
    pub top_k: usize,

    /// Maximum in-flight embedding requests during ingestion
    pub ingest_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            ingest_concurrency: 4,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFile {
    gateway: Option<GatewayConfig>,
    generation: Option<GenerationConfig>,
    embedding: Option<EmbeddingConfig>,
    chunking: Option<ChunkingConfig>,
    index: Option<IndexConfig>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct LoggingConfig {
    level: Option<String>,
    format: Option<LogFormat>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            api_key: None,
            log_level: None,
            log_format: LogFormat::Pretty,
            verbose: false,
            no_color: false,
            gateway: GatewayConfig::default(),
            generation: GenerationConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            index: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and the environment.
    ///
    /// Environment variables:
    /// - `TOOLRAG_WORKSPACE`: workspace path
    /// - `TOOLRAG_CONFIG`: config file path
    /// - `TOOLRAG_PROVIDER`: gateway provider
    /// - `TOOLRAG_MODEL`: generation model
    /// - `TOOLRAG_GATEWAY_URL`: gateway base URL
    /// - `TOOLRAG_API_KEY`: API key
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`load`](Self::load), with an explicit workspace and config file
    /// taking precedence over the environment.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var_os("TOOLRAG_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        let config_file =
            config_file.or_else(|| std::env::var_os("TOOLRAG_CONFIG").map(PathBuf::from));
        if let Some(config_file) = config_file {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides on top of file settings.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("TOOLRAG_PROVIDER") {
            self.gateway.provider = provider;
        }

        if let Ok(model) = std::env::var("TOOLRAG_MODEL") {
            self.generation.model = model;
        }

        if let Ok(url) = std::env::var("TOOLRAG_GATEWAY_URL") {
            self.gateway.base_url = url;
        }

        if let Ok(key) = std::env::var("TOOLRAG_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents).map_err(|e| match e {
            AppError::Serialization(msg) => {
                AppError::Config(format!("Failed to parse config file {:?}: {}", path, msg))
            }
            other => other,
        })
    }

    fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();
        tracing::debug!("Merging configuration file");

        if let Some(gateway) = file.gateway {
            result.gateway = gateway;
        }
        if let Some(generation) = file.generation {
            result.generation = generation;
        }
        if let Some(embedding) = file.embedding {
            result.embedding = embedding;
        }
        if let Some(chunking) = file.chunking {
            result.chunking = chunking;
        }
        if let Some(index) = file.index {
            result.index = index;
        }
        if let Some(retrieval) = file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.gateway.provider = provider;
        }

        if let Some(model) = model {
            self.generation.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Select the index backend by name (`memory`, `in-memory` or `sqlite`).
    pub fn with_index_backend(mut self, backend: Option<&str>) -> AppResult<Self> {
        if let Some(name) = backend {
            self.index.backend = IndexBackend::parse(name).ok_or_else(|| {
                AppError::InvalidConfiguration(format!(
                    "Unknown index backend: '{}'. Supported: memory, sqlite",
                    name
                ))
            })?;
        }
        Ok(self)
    }

    /// Path to the `.toolrag` state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".toolrag")
    }

    /// Ensure the state directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .toolrag directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolved path of the SQLite index file.
    pub fn index_path(&self) -> PathBuf {
        if self.index.path.is_absolute() {
            self.index.path.clone()
        } else {
            self.state_dir().join(&self.index.path)
        }
    }

    /// Resolve the gateway API key: explicit override first, then the
    /// configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.gateway.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate settings that would otherwise fail late.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.gateway.provider.to_lowercase();
        if !GATEWAY_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.gateway.provider,
                GATEWAY_PROVIDERS.join(", ")
            )));
        }

        match self.embedding.provider.as_str() {
            "gateway" | "mock" => {}
            other => {
                return Err(AppError::Config(format!(
                    "Unknown embedding provider: {}. Supported: gateway, mock",
                    other
                )))
            }
        }

        if self.embedding.dimensions == Some(0) {
            return Err(AppError::InvalidConfiguration(
                "embedding.dimensions must be > 0".to_string(),
            ));
        }

        let ChunkingConfig {
            chunk_size,
            overlap,
        } = self.chunking;
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(AppError::InvalidConfiguration(format!(
                "chunking requires chunkSize > 0 and overlap < chunkSize (got {}/{})",
                chunk_size, overlap
            )));
        }

        if self.retrieval.ingest_concurrency == 0 {
            return Err(AppError::InvalidConfiguration(
                "retrieval.ingestConcurrency must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
