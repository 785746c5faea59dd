use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{Provider, TranslationRequest};
use crate::translation::backend_pool::BackendEndpoint;

/// Language pairs the local model is trusted with
const SUPPORTED_PAIRS: [(&str, &str); 2] = [("es", "en"), ("zh", "en")];

/// Ollama client serving a local translation model
#[derive(Debug, Clone)]
pub struct Ollama {
    /// HTTP client for making requests
    client: Client,
    /// Model name to use for generation
    model: String,
    /// Client-side timeout
    timeout: Duration,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client for the given model
    ///
    /// Ollama speaks HTTP/1.1; connections are kept alive between chunks.
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            model: model.into(),
            timeout,
        }
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the local model handles this language pair
    pub fn supports_pair(source_language: &str, target_language: &str) -> bool {
        SUPPORTED_PAIRS
            .iter()
            .any(|(s, t)| language_utils::language_codes_match(s, source_language)
                && language_utils::language_codes_match(t, target_language))
    }

    /// Build the generation request for a translation
    pub fn build_request(&self, request: &TranslationRequest) -> GenerationRequest {
        let source_name = language_utils::get_language_name(&request.source_language)
            .unwrap_or_else(|_| request.source_language.clone());
        let target_name = language_utils::get_language_name(&request.target_language)
            .unwrap_or_else(|_| request.target_language.clone());

        let system = format!(
            "You are a professional translator. Translate the user's text from {} to {}. \
             Keep the line breaks of the original. Reply with the translation only.",
            source_name, target_name
        );

        // About four tokens per source word, within fixed bounds
        let word_count = request.text.split_whitespace().count() as u32;
        let num_predict = (word_count * 4).clamp(64, 2048);

        GenerationRequest::new(self.model.clone(), request.text.clone())
            .system(system)
            .temperature(0.1)
            .num_predict(num_predict)
    }

    /// Parse a generate response, tolerating streamed JSON lines
    pub fn parse_response(response_text: &str) -> Result<String, ProviderError> {
        if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(response_text) {
            return Ok(parsed.response.trim().to_string());
        }

        // The server may ignore `stream: false` and send one object per line
        let mut full_response = String::new();
        let mut parsed_any = false;
        for line in response_text.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<GenerationResponse>(line) {
                Ok(part) => {
                    parsed_any = true;
                    full_response.push_str(&part.response);
                }
                Err(e) => {
                    error!("Failed to parse Ollama response line: {}", e);
                }
            }
        }

        if parsed_any {
            Ok(full_response.trim().to_string())
        } else {
            let preview: String = response_text.chars().take(200).collect();
            Err(ProviderError::ParseError(format!(
                "Response contains invalid JSON: {}",
                preview
            )))
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn translate(
        &self,
        endpoint: &BackendEndpoint,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        if !Self::supports_pair(&request.source_language, &request.target_language) {
            return Err(ProviderError::UnsupportedLanguagePair {
                source_language: request.source_language.clone(),
                target_language: request.target_language.clone(),
            });
        }

        let url = endpoint.join("api/generate");
        let body = self.build_request(request);
        debug!("POST {} with model {}", url, self.model);

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    millis: self.timeout.as_millis() as u64,
                }
            } else {
                ProviderError::ConnectionError(format!("Failed to send request to Ollama API: {}", e))
            }
        })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        if !status.is_success() {
            error!("Ollama API error ({}): {}", status, response_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: response_text,
            });
        }

        Self::parse_response(&response_text)
    }

    async fn test_connection(&self, endpoint: &BackendEndpoint) -> Result<(), ProviderError> {
        let url = endpoint.join("api/version");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "Failed to get Ollama version".to_string(),
            });
        }

        let version: VersionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        debug!("Connected to Ollama {} at {}", version.version, endpoint);
        Ok(())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
