//! Gemini REST client for embeddings and text generation.

use crate::llm::client::LLMClient;
use crate::rag::embeddings::{EmbeddingProvider, TaskType};
use crate::types::{AppError, ProviderFailure, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    /// `model` may be given with or without the `models/` prefix.
    pub fn new(api_key: String, api_base: String, model: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Configuration(format!("Gemini client: {}", e)))?;

        let model = if model.starts_with("models/") {
            model
        } else {
            format!("models/{}", model)
        };

        Ok(Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}:{}", self.api_base, self.model, method)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.endpoint(method))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(status_error(status, &detail));
        }

        response.json::<R>().await.map_err(|e| {
            AppError::provider(
                ProviderFailure::InvalidResponse,
                format!("Gemini {} response: {}", method, e),
            )
        })
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    let kind = if err.is_timeout() {
        ProviderFailure::Timeout
    } else {
        ProviderFailure::Network
    };
    AppError::provider(kind, format!("Gemini request failed: {}", err))
}

fn status_error(status: StatusCode, detail: &str) -> AppError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderFailure::Auth,
        StatusCode::TOO_MANY_REQUESTS => ProviderFailure::RateLimit,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderFailure::Timeout,
        _ => ProviderFailure::Network,
    };
    AppError::provider(kind, format!("Gemini returned {}: {}", status, detail))
}

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, texts: &[String], task: TaskType) -> Result<Vec<Vec<f32>>> {
        if let [text] = texts {
            let body = json!({
                "model": self.model,
                "content": { "parts": [{ "text": text }] },
                "taskType": task.as_str(),
            });
            let response: EmbedContentResponse = self.post("embedContent", &body).await?;
            return Ok(vec![response.embedding.values]);
        }

        let requests: Vec<_> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": self.model,
                    "content": { "parts": [{ "text": text }] },
                    "taskType": task.as_str(),
                })
            })
            .collect();
        let body = json!({ "requests": requests });
        let response: BatchEmbedContentsResponse =
            self.post("batchEmbedContents", &body).await?;

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });
        let response: GenerateContentResponse = self.post("generateContent", &body).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::provider(
                ProviderFailure::InvalidResponse,
                "Gemini returned no candidates",
            ));
        }
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
