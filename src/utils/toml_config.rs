//! TOML-based configuration for pyq-analyser
//!
//! Providers, models, retrieval defaults and the extraction sidecar are all
//! declared in `pyq.toml`. Credentials never live in the file: providers name
//! the environment variable that holds their key.
//!
//! Use `PyqConfigManager` for thread-safe access to the current configuration.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Root configuration structure loaded from pyq.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyqConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Named provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Embedding model used for both chunks and questions
    pub embedding: EmbeddingConfig,

    /// Generative model used to answer questions
    pub generation: GenerationConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        /// Environment variable containing the API key
        #[serde(default = "default_gemini_key_env")]
        api_key_env: String,
        #[serde(default = "default_gemini_base")]
        api_base: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

fn default_gemini_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

// ============= Model Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Dimensionality every returned vector must have
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String {
    "models/text-embedding-004".to_string()
}

fn default_dimensions() -> usize {
    768
}

fn default_embedding_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Reference to a provider name defined in [providers]
    pub provider: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_model() -> String {
    "models/gemini-2.5-flash".to_string()
}

fn default_generation_timeout() -> u64 {
    60
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Words per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunks retrieved when a request does not name `k`
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Largest `k` a request may ask for
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
}

fn default_chunk_size() -> usize {
    300
}

fn default_top_k() -> usize {
    4
}

fn default_max_top_k() -> usize {
    50
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            top_k: default_top_k(),
            max_top_k: default_max_top_k(),
        }
    }
}

// ============= Extraction Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Base URL of the sidecar that converts pdf/docx/pptx to text.
    /// Without it only plain-text uploads can be extracted.
    #[serde(default)]
    pub service_url: Option<String>,

    #[serde(default = "default_extraction_timeout")]
    pub timeout_secs: u64,
}

fn default_extraction_timeout() -> u64 {
    120
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            timeout_secs: default_extraction_timeout(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Provider '{0}' referenced by [{1}] does not exist")]
    MissingProvider(String, String),
}

impl PyqConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: PyqConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, provider) in [
            ("embedding", &self.embedding.provider),
            ("generation", &self.generation.provider),
        ] {
            if !self.providers.contains_key(provider) {
                return Err(ConfigError::MissingProvider(
                    provider.clone(),
                    section.to_string(),
                ));
            }
        }

        for provider in self.providers.values() {
            if let ProviderConfig::Gemini { api_key_env, .. } = provider {
                self.validate_env_var(api_key_env)?;
            }
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        if self.rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_size must be greater than zero".to_string(),
            ));
        }
        for (key, secs) in [
            ("embedding.timeout_secs", self.embedding.timeout_secs),
            ("generation.timeout_secs", self.generation.timeout_secs),
            ("extraction.timeout_secs", self.extraction.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }
        if self.rag.top_k == 0 || self.rag.top_k > self.rag.max_top_k {
            return Err(ConfigError::ValidationError(format!(
                "rag.top_k must be between 1 and rag.max_top_k ({})",
                self.rag.max_top_k
            )));
        }
        if let Some(ref url) = self.extraction.service_url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "extraction.service_url must not be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Get provider by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }

    /// Provider backing the embedding model
    pub fn embedding_provider(&self) -> Result<&ProviderConfig, ConfigError> {
        self.get_provider(&self.embedding.provider).ok_or_else(|| {
            ConfigError::MissingProvider(self.embedding.provider.clone(), "embedding".to_string())
        })
    }

    /// Sections of `next` that differ from `self` and only take effect after a
    /// restart. `[rag]` and `generation.timeout_secs` are read per request.
    pub fn restart_required(&self, next: &PyqConfig) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.server != next.server {
            changed.push("server");
        }
        if self.providers != next.providers {
            changed.push("providers");
        }
        if self.embedding != next.embedding {
            changed.push("embedding");
        }
        if self.generation.provider != next.generation.provider
            || self.generation.model != next.generation.model
        {
            changed.push("generation");
        }
        if self.extraction != next.extraction {
            changed.push("extraction");
        }
        changed
    }

    /// Provider backing the generation model
    pub fn generation_provider(&self) -> Result<&ProviderConfig, ConfigError> {
        self.get_provider(&self.generation.provider).ok_or_else(|| {
            ConfigError::MissingProvider(self.generation.provider.clone(), "generation".to_string())
        })
    }
}

// ============= Configuration Manager =============

/// Thread-safe configuration holder with lockless reads
///
/// Reloading swaps the whole configuration. Retrieval settings are read per
/// request and apply at once; components built at startup (index dimensions,
/// provider clients, extraction service) keep their settings until restart.
pub struct PyqConfigManager {
    config: Arc<ArcSwap<PyqConfig>>,
    config_path: PathBuf,
}

impl PyqConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = PyqConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
        })
    }

    /// Create a config manager directly from a config (useful for testing)
    pub fn from_config(config: PyqConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("test-config.toml"),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<PyqConfig> {
        self.config.load_full()
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    ///
    /// An invalid file leaves the current configuration in place. Returns the
    /// sections that changed but need a restart to apply.
    pub fn reload(&self) -> Result<Vec<&'static str>, ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = PyqConfig::load(&self.config_path)?;
        let previous = self.config.swap(Arc::new(new_config));
        let restart_required = previous.restart_required(&self.config.load());

        if restart_required.is_empty() {
            info!("Configuration reloaded successfully");
        } else {
            warn!(
                sections = ?restart_required,
                "Configuration reloaded; some changes apply only after a restart"
            );
        }
        Ok(restart_required)
    }
}

impl Clone for PyqConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 9000
log_level = "debug"
log_format = "json"

[providers.local]
type = "ollama"
base_url = "http://localhost:11434"

[embedding]
provider = "local"
model = "nomic-embed-text"

[generation]
provider = "local"
model = "llama3.2"
timeout_secs = 15

[rag]
chunk_size = 200
top_k = 3
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config = PyqConfig::parse(&create_test_config()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.generation.timeout_secs, 15);
        assert_eq!(config.rag.chunk_size, 200);
        assert_eq!(config.rag.top_k, 3);
        assert!(matches!(
            config.get_provider("local"),
            Some(ProviderConfig::Ollama { .. })
        ));
    }

    #[test]
    fn test_defaults() {
        let config = PyqConfig::parse(
            r#"
[providers.local]
type = "ollama"

[embedding]
provider = "local"

[generation]
provider = "local"
"#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert_eq!(config.embedding.model, "models/text-embedding-004");
        assert_eq!(config.embedding.dimensions, 768);
        assert_eq!(config.generation.model, "models/gemini-2.5-flash");
        assert_eq!(config.rag.chunk_size, 300);
        assert_eq!(config.rag.top_k, 4);
        assert!(config.extraction.service_url.is_none());
        match config.get_provider("local") {
            Some(ProviderConfig::Ollama { base_url }) => {
                assert_eq!(base_url, "http://localhost:11434")
            }
            other => panic!("unexpected provider: {:?}", other),
        }
    }

    #[test]
    fn test_validation_missing_provider() {
        let err = PyqConfig::parse(
            r#"
[providers.local]
type = "ollama"

[embedding]
provider = "local"

[generation]
provider = "cloud"
"#,
        )
        .unwrap_err();

        match err {
            ConfigError::MissingProvider(provider, section) => {
                assert_eq!(provider, "cloud");
                assert_eq!(section, "generation");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_validation_missing_env_var() {
        let err = PyqConfig::parse(
            r#"
[providers.gemini]
type = "gemini"
api_key_env = "PYQ_TEST_KEY_THAT_IS_NEVER_SET"

[embedding]
provider = "gemini"

[generation]
provider = "gemini"
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "PYQ_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_validation_rejects_top_k_above_max() {
        let mut config = PyqConfig::parse(&create_test_config()).unwrap();
        config.rag.top_k = 100;
        config.rag.max_top_k = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        let mut config = PyqConfig::parse(&create_test_config()).unwrap();
        config.embedding.dimensions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = PyqConfig::load("/definitely/not/here/pyq.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_validation_rejects_zero_timeouts() {
        for key in ["embedding", "generation", "extraction"] {
            let mut config = PyqConfig::parse(&create_test_config()).unwrap();
            match key {
                "embedding" => config.embedding.timeout_secs = 0,
                "generation" => config.generation.timeout_secs = 0,
                _ => config.extraction.timeout_secs = 0,
            }
            match config.validate() {
                Err(ConfigError::ValidationError(msg)) => {
                    assert_eq!(msg, format!("{}.timeout_secs must be greater than zero", key))
                }
                other => panic!("expected validation error for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_zero_timeout_in_file_is_rejected() {
        let content = create_test_config().replace("timeout_secs = 15", "timeout_secs = 0");
        assert!(matches!(
            PyqConfig::parse(&content),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_manager_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();

        let manager = PyqConfigManager::new(file.path()).unwrap();
        assert_eq!(manager.config().rag.top_k, 3);
        assert_eq!(manager.path(), file.path());

        let updated = create_test_config().replace("top_k = 3", "top_k = 7");
        fs::write(file.path(), updated).unwrap();
        let restart_required = manager.reload().unwrap();

        assert_eq!(manager.config().rag.top_k, 7);
        assert!(restart_required.is_empty());
    }

    #[test]
    fn test_config_manager_reload_reports_restart_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();
        let manager = PyqConfigManager::new(file.path()).unwrap();

        let updated = create_test_config()
            .replace("port = 9000", "port = 9001")
            .replace("model = \"llama3.2\"", "model = \"mistral\"")
            .replace("timeout_secs = 15", "timeout_secs = 20");
        fs::write(file.path(), updated).unwrap();

        assert_eq!(manager.reload().unwrap(), vec!["server", "generation"]);
        assert_eq!(manager.config().generation.timeout_secs, 20);
    }

    #[test]
    fn test_config_manager_reload_keeps_config_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();
        let manager = PyqConfigManager::new(file.path()).unwrap();

        fs::write(file.path(), "not = [valid").unwrap();

        assert!(manager.reload().is_err());
        assert_eq!(manager.config().rag.top_k, 3);
    }

    #[test]
    fn test_config_manager_from_config() {
        let config = PyqConfig::parse(&create_test_config()).unwrap();
        let manager = PyqConfigManager::from_config(config);
        let cloned = manager.clone();
        assert_eq!(cloned.config().server.port, 9000);
    }
}
