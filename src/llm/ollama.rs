use crate::llm::client::LLMClient;
use crate::rag::embeddings::{EmbeddingProvider, TaskType};
use crate::types::{AppError, ProviderFailure, Result};
use async_trait::async_trait;
use ollama_rs::{
    generation::{
        chat::{request::ChatMessageRequest, ChatMessage},
        embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest},
    },
    Ollama,
};

const DEFAULT_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: String) -> Result<Self> {
        let (origin, port) = split_base_url(base_url)?;
        let client = Ollama::new(origin, port);

        Ok(Self { client, model })
    }
}

/// Split `scheme://host[:port]` into the origin and port Ollama expects.
fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| AppError::Configuration(format!("invalid Ollama URL '{}': {}", base_url, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| AppError::Configuration(format!("Ollama URL '{}' has no host", base_url)))?;
    let port = url.port().unwrap_or(DEFAULT_PORT);

    Ok((format!("{}://{}", url.scheme(), host), port))
}

fn ollama_error(err: impl std::fmt::Display) -> AppError {
    AppError::provider(ProviderFailure::Network, format!("Ollama error: {}", err))
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt.to_string())];
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(ollama_error)?;

        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    // Ollama has no task-type hint.
    async fn embed(&self, texts: &[String], _task: TaskType) -> Result<Vec<Vec<f32>>> {
        let request =
            GenerateEmbeddingsRequest::new(self.model.clone(), EmbeddingsInput::Multiple(texts.to_vec()));

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(ollama_error)?;

        Ok(response.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parsing_full() {
        let (origin, port) = split_base_url("http://localhost:11434").unwrap();
        assert_eq!(origin, "http://localhost");
        assert_eq!(port, 11434);
    }

    #[test]
    fn test_url_parsing_no_port() {
        let (origin, port) = split_base_url("https://ollama.internal").unwrap();
        assert_eq!(origin, "https://ollama.internal");
        assert_eq!(port, DEFAULT_PORT);
    }

    #[test]
    fn test_url_parsing_custom_port() {
        let (origin, port) = split_base_url("http://192.168.1.100:8080/").unwrap();
        assert_eq!(origin, "http://192.168.1.100");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        assert!(matches!(
            split_base_url("localhost:11434"),
            Err(AppError::Configuration(_))
        ));
        assert!(split_base_url("not a url").is_err());
    }

    #[test]
    fn test_client_builds() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2".to_string()).unwrap();
        assert_eq!(LLMClient::model_name(&client), "llama3.2");
    }
}
