//! Document text extraction
//!
//! Plain text is decoded in-process. Binary office formats are posted to an
//! extraction sidecar (`POST {service_url}/extract?format=<ext>`) which answers
//! with `{"text": "..."}`.

use crate::types::{AppError, Result};
use crate::utils::toml_config::ExtractionConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Upload formats accepted by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Pptx,
    Txt,
}

impl DocumentFormat {
    /// Resolve the format from the text after the last `.` of a filename.
    ///
    /// Matching is case-insensitive. A filename without a dot is treated as
    /// all extension, so it is rejected with `UnsupportedFormat` like any
    /// other extension outside the supported set.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or(filename)
            .to_ascii_lowercase();

        match ext.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "pptx" => Ok(DocumentFormat::Pptx),
            "txt" => Ok(DocumentFormat::Txt),
            _ => Err(AppError::UnsupportedFormat(ext)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Txt => "txt",
        }
    }

    /// Whether the bytes can be decoded without the sidecar.
    pub fn is_plain_text(&self) -> bool {
        matches!(self, DocumentFormat::Txt)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// External text extraction capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String>;
}

/// Decodes UTF-8 text, replacing invalid sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl Extractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String> {
        if !format.is_plain_text() {
            return Err(AppError::Extraction(format!(
                "{} documents cannot be decoded as plain text",
                format
            )));
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[derive(Debug, Deserialize)]
struct SidecarResponse {
    text: String,
}

/// HTTP client for the extraction sidecar.
#[derive(Debug, Clone)]
pub struct SidecarExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl SidecarExtractor {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("extraction client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Extractor for SidecarExtractor {
    async fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String> {
        let url = format!("{}/extract", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("format", format.extension())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, %format, "Extraction service request failed");
                AppError::Extraction(format!(
                    "extraction service unavailable for {} documents",
                    format
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Extraction(format!(
                "sidecar rejected {} document ({}): {}",
                format, status, detail
            )));
        }

        let body: SidecarResponse = response
            .json()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, %format, "Malformed extraction service response");
                AppError::Extraction(format!(
                    "extraction service returned an unreadable response for {} documents",
                    format
                ))
            })?;

        Ok(body.text)
    }
}

/// Routes each format to the extractor able to handle it.
#[derive(Clone)]
pub struct ExtractorRegistry {
    plain: Arc<dyn Extractor>,
    binary: Option<Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new(plain: Arc<dyn Extractor>, binary: Option<Arc<dyn Extractor>>) -> Self {
        Self { plain, binary }
    }

    /// Plain text only; binary formats fail with an extraction error.
    pub fn plain_text_only() -> Self {
        Self::new(Arc::new(PlainTextExtractor), None)
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let binary = match config.service_url {
            Some(ref url) => {
                let sidecar =
                    SidecarExtractor::new(url.clone(), Duration::from_secs(config.timeout_secs))?;
                Some(Arc::new(sidecar) as Arc<dyn Extractor>)
            }
            None => None,
        };
        Ok(Self::new(Arc::new(PlainTextExtractor), binary))
    }

    pub fn has_binary_support(&self) -> bool {
        self.binary.is_some()
    }
}

#[async_trait]
impl Extractor for ExtractorRegistry {
    async fn extract(&self, bytes: &[u8], format: DocumentFormat) -> Result<String> {
        if format.is_plain_text() {
            return self.plain.extract(bytes, format).await;
        }

        match self.binary {
            Some(ref extractor) => extractor.extract(bytes, format).await,
            None => Err(AppError::Extraction(format!(
                "no extraction service configured for {} documents",
                format
            ))),
        }
    }
}
