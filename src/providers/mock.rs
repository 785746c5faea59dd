/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::fail_first(n)` - Fails the first n requests, then recovers
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Endpoint-specific behavior can be layered on top with `failing_on` and
 * `slow_on`, which is how rotation across a backend pool is exercised.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Provider, TranslationRequest};
use crate::translation::backend_pool::BackendEndpoint;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then succeeds
    FailFirst { calls: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// A call observed by the mock provider
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Base URL of the endpoint that was called
    pub endpoint: String,
    /// Text sent for translation
    pub text: String,
    /// Source language of the request
    pub source_language: String,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&TranslationRequest) -> String>,
    /// Endpoints that always fail
    failing_endpoints: Vec<String>,
    /// Endpoints that answer only after a delay
    slow_endpoints: Vec<(String, u64)>,
    /// Every call, in order
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
            failing_endpoints: Vec::new(),
            slow_endpoints: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that fails its first `calls` requests
    pub fn fail_first(calls: usize) -> Self {
        Self::new(MockBehavior::FailFirst { calls })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&TranslationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Make every call to `endpoint` fail with a 503
    pub fn failing_on(mut self, endpoint: &str) -> Self {
        self.failing_endpoints.push(normalize(endpoint));
        self
    }

    /// Delay every call to `endpoint` by `delay_ms`
    pub fn slow_on(mut self, endpoint: &str, delay_ms: u64) -> Self {
        self.slow_endpoints.push((normalize(endpoint), delay_ms));
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Snapshot of all calls made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Endpoints called, in order
    pub fn called_endpoints(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.endpoint.clone()).collect()
    }

    fn respond(&self, request: &TranslationRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => format!("[{}] {}", request.target_language.to_uppercase(), request.text),
        }
    }
}

fn normalize(endpoint: &str) -> String {
    BackendEndpoint::parse(endpoint)
        .map(|e| e.base_url().to_string())
        .unwrap_or_else(|_| endpoint.trim_end_matches('/').to_string())
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
            failing_endpoints: self.failing_endpoints.clone(),
            slow_endpoints: self.slow_endpoints.clone(),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(
        &self,
        endpoint: &BackendEndpoint,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let base_url = endpoint.base_url().to_string();

        self.calls.lock().push(MockCall {
            endpoint: base_url.clone(),
            text: request.text.clone(),
            source_language: request.source_language.clone(),
        });

        if let Some((_, delay_ms)) = self.slow_endpoints.iter().find(|(url, _)| *url == base_url) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }

        if self.failing_endpoints.contains(&base_url) {
            return Err(ProviderError::ApiError {
                message: format!("Simulated failure on {}", base_url),
                status_code: 503,
            });
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(request)),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.respond(request))
                }
            }

            MockBehavior::FailFirst { calls } => {
                if count < calls {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated connection failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.respond(request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.respond(request))
            }
        }
    }

    async fn test_connection(&self, endpoint: &BackendEndpoint) -> Result<(), ProviderError> {
        if self.failing_endpoints.contains(&endpoint.base_url().to_string())
            || self.behavior == MockBehavior::Failing
        {
            Err(ProviderError::ConnectionError(format!("{} unreachable", endpoint)))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
