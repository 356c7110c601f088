//! Gemini assist backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use eventra_core::{AssistBackend, Error, Result};

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 30;

/// Gemini generateContent backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
    /// Create a backend from explicit configuration.
    pub fn with_config(base_url: String, model: String, api_key: String) -> Result<Self> {
        let timeout = std::env::var("EVENTRA_ASSIST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            subsystem = "assist",
            backend = "gemini",
            model = %model,
            "Initializing Gemini backend"
        );

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
        })
    }

    /// Build a backend from the environment, or `None` when no
    /// `GEMINI_API_KEY` is set. Callers fall back to deterministic planning.
    pub fn from_env() -> Result<Option<Self>> {
        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                info!(
                    subsystem = "assist",
                    backend = "gemini",
                    "GEMINI_API_KEY not set; assist runs rule-based only"
                );
                return Ok(None);
            }
        };
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string());
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        Ok(Some(Self::with_config(base_url, model, api_key)?))
    }
}

#[async_trait]
impl AssistBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(
                subsystem = "assist",
                backend = "gemini",
                status = %status,
                "Gemini returned non-success status"
            );
            return Err(Error::Inference(format!(
                "gemini returned status {status}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("gemini response parse failed: {e}")))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| Error::Inference("gemini response contained no text".to_string()))?;

        debug!(
            subsystem = "assist",
            backend = "gemini",
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = text.len(),
            "Generation complete"
        );
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn test_generate_extracts_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("hello")))
            .mount(&server)
            .await;

        let backend = GeminiBackend::with_config(
            server.uri(),
            DEFAULT_GEMINI_MODEL.to_string(),
            "test-key".to_string(),
        )
        .unwrap();

        assert_eq!(backend.generate("hi").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors_as_inference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let backend = GeminiBackend::with_config(
            server.uri(),
            DEFAULT_GEMINI_MODEL.to_string(),
            "test-key".to_string(),
        )
        .unwrap();

        assert!(matches!(
            backend.generate("hi").await,
            Err(Error::Inference(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let backend = GeminiBackend::with_config(
            server.uri(),
            DEFAULT_GEMINI_MODEL.to_string(),
            "test-key".to_string(),
        )
        .unwrap();

        assert!(backend.generate("hi").await.is_err());
    }
}
