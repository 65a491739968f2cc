//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface over the providers pyq-analyser
//! can talk to:
//! - **Gemini**: REST API, used for both embeddings and generation
//! - **Ollama**: local inference server (requires the `ollama` feature)

use crate::rag::embeddings::EmbeddingProvider;
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigError, ProviderConfig, PyqConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// All generation providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Embeddings | Generation | Notes |
/// |----------|------------|------------|-------|
/// | Gemini | ✅ | ✅ | Default, needs an API key |
/// | Ollama | ✅ | ✅ | Local, `ollama` feature |
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini REST API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: std::env::var("GOOGLE_API_KEY")?,
    ///     api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
    ///     model: "models/gemini-2.5-flash".to_string(),
    /// };
    /// ```
    Gemini {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "nomic-embed-text".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Build a provider from its `[providers.<name>]` entry and a model name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when a Gemini key is not set.
    pub fn from_config(
        config: &PyqConfig,
        provider: &ProviderConfig,
        model: &str,
    ) -> std::result::Result<Self, ConfigError> {
        match provider {
            ProviderConfig::Gemini {
                api_key_env,
                api_base,
            } => {
                let api_key = config
                    .resolve_env(api_key_env)
                    .ok_or_else(|| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::Gemini {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.to_string(),
                })
            }
            ProviderConfig::Ollama { base_url } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.to_string(),
            }),
        }
    }

    /// Provider configured for the `[embedding]` section.
    pub fn for_embedding(config: &PyqConfig) -> std::result::Result<Self, ConfigError> {
        Self::from_config(config, config.embedding_provider()?, &config.embedding.model)
    }

    /// Provider configured for the `[generation]` section.
    pub fn for_generation(config: &PyqConfig) -> std::result::Result<Self, ConfigError> {
        Self::from_config(
            config,
            config.generation_provider()?,
            &config.generation.model,
        )
    }

    /// Create a generation client for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's feature is disabled or its client
    /// cannot be built from the configuration.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )?)),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url, model.clone())?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { .. } => Err(feature_disabled("ollama")),
        }
    }

    /// Create an embedding client for this provider
    pub fn create_embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        match self {
            Provider::Gemini {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )?)),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url, model.clone())?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { .. } => Err(feature_disabled("ollama")),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// Model this provider was configured with
    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

#[cfg(not(feature = "ollama"))]
fn feature_disabled(feature: &str) -> AppError {
    AppError::Configuration(format!(
        "provider requires the '{}' feature, rebuild with --features {}",
        feature, feature
    ))
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}
