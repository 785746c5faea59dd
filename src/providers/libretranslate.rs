use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Provider, TranslationRequest};
use crate::translation::backend_pool::BackendEndpoint;

/// Client for LibreTranslate-compatible HTTP services
#[derive(Debug, Clone)]
pub struct LibreTranslate {
    /// HTTP client for making requests
    client: Client,
    /// Client-side timeout
    timeout: Duration,
}

/// Request body for `POST /translate`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LibreTranslateRequest {
    /// Text to translate
    pub q: String,
    /// Source language code or "auto"
    pub source: String,
    /// Target language code
    pub target: String,
    /// Input format, always "text"
    pub format: String,
}

impl LibreTranslateRequest {
    pub fn from_request(request: &TranslationRequest) -> Self {
        Self {
            q: request.text.clone(),
            source: request.source_language.clone(),
            target: request.target_language.clone(),
            format: "text".to_string(),
        }
    }
}

/// Response body of `POST /translate`
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LibreTranslateResponse {
    /// Translated text; absent on some error payloads
    #[serde(rename = "translatedText", default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

/// Error body returned alongside non-success statuses
#[derive(Debug, Deserialize)]
struct LibreTranslateErrorBody {
    error: String,
}

impl LibreTranslate {
    /// Create a new client
    ///
    /// The per-call timeout is enforced by the translation client; the HTTP
    /// client timeout is a backstop with the same value.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    /// Extract the translated text from a response body
    pub fn extract_text(response: &LibreTranslateResponse) -> String {
        response.translated_text.clone().unwrap_or_default()
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<LibreTranslateErrorBody>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.chars().take(200).collect())
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    async fn translate(
        &self,
        endpoint: &BackendEndpoint,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let url = endpoint.join("translate");
        let body = LibreTranslateRequest::from_request(request);

        debug!("POST {} ({} chars)", url, request.text.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        millis: self.timeout.as_millis() as u64,
                    }
                } else {
                    ProviderError::ConnectionError(format!("Failed to send request to {}: {}", url, e))
                }
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = Self::error_message(&response_text);
            error!("Translation API error ({}) from {}: {}", status, endpoint, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: LibreTranslateResponse = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::ParseError(format!("{} (body: {})", e, Self::error_message(&response_text))))?;

        Ok(Self::extract_text(&parsed))
    }

    async fn test_connection(&self, endpoint: &BackendEndpoint) -> Result<(), ProviderError> {
        let url = endpoint.join("languages");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: format!("Connection test against {} failed", url),
            })
        }
    }

    fn name(&self) -> &str {
        "LibreTranslate"
    }
}
