/*!
 * Provider implementations for different translation backends.
 *
 * This module contains client implementations for the supported backends:
 * - LibreTranslate: remote HTTP translation service
 * - Ollama: local model server
 * - Mock: scripted provider for tests and dry runs
 *
 * A provider performs exactly one attempt against one endpoint. Retries,
 * timeouts and endpoint rotation belong to the translation client.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{BackendKind, TranslationConfig};
use crate::errors::ProviderError;
use crate::translation::backend_pool::BackendEndpoint;

/// A single translation request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    /// The text to translate
    pub text: String,
    /// Source language code ("es", "zh" or "auto")
    pub source_language: String,
    /// Target language code
    pub target_language: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

/// Common trait for all translation backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate a request against the given endpoint
    ///
    /// # Arguments
    /// * `endpoint` - The backend to call
    /// * `request` - The text and language pair
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text, empty if the
    ///   backend answered without a translation
    async fn translate(
        &self,
        endpoint: &BackendEndpoint,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError>;

    /// Test the connection to an endpoint
    async fn test_connection(&self, endpoint: &BackendEndpoint) -> Result<(), ProviderError>;

    /// Human readable provider name
    fn name(&self) -> &str;
}

/// Build the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Arc<dyn Provider> {
    let timeout = std::time::Duration::from_secs(config.common.timeout_secs);
    match config.backend {
        BackendKind::Remote => Arc::new(libretranslate::LibreTranslate::new(timeout)),
        BackendKind::Local => Arc::new(ollama::Ollama::new(config.local_model.clone(), timeout)),
    }
}

pub mod libretranslate;
pub mod mock;
pub mod ollama;
