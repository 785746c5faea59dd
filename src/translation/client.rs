/*!
 * Per-chunk translation with bounded retries and backend rotation.
 *
 * Every failed attempt rotates the shared backend pool, so the next attempt
 * (and every later chunk) starts from the next endpoint in the ring. The
 * backoff between attempts is fixed, not exponential.
 */

use log::{debug, error, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::{Provider, TranslationRequest};
use crate::translation::backend_pool::BackendPool;
use crate::translation::chunker::Chunk;
use crate::translation::progress::{NoopReporter, ProgressReporter};

/// Retry budget and timing for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
    /// Per-call timeout
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Total number of attempts per chunk
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(1000),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Counters over the lifetime of a client
#[derive(Debug, Default)]
struct ClientCounters {
    attempts: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
}

/// Snapshot of client counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Backend calls made
    pub attempts: u64,
    /// Backend calls that failed (each one rotated the pool)
    pub failures: u64,
    /// Blank chunks answered without a call
    pub skipped: u64,
}

/// Translates chunks against a shared backend pool
#[derive(Debug)]
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    pool: Arc<BackendPool>,
    policy: RetryPolicy,
    reporter: Arc<dyn ProgressReporter>,
    counters: ClientCounters,
}

impl TranslationClient {
    /// Create a client with a silent reporter
    pub fn new(provider: Arc<dyn Provider>, pool: Arc<BackendPool>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            pool,
            policy,
            reporter: Arc::new(NoopReporter),
            counters: ClientCounters::default(),
        }
    }

    /// Route retry status messages to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Shared backend pool
    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Active retry policy
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Provider name, for logs
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            attempts: self.counters.attempts.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Translate one chunk, retrying across the pool
    ///
    /// # Returns
    /// * `Ok("")` for blank chunks without contacting any backend
    /// * `Err(TranslationError::RetriesExhausted)` once every attempt failed
    pub async fn translate_chunk(
        &self,
        chunk: &Chunk,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if chunk.is_blank() {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Chunk {} is blank, skipping backend call", chunk.index);
            return Ok(String::new());
        }

        let request = TranslationRequest::new(chunk.text.clone(), source_language, target_language);
        let max_attempts = self.policy.max_attempts();
        let mut last_error = ProviderError::RequestFailed("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            let endpoint = self.pool.current();
            self.counters.attempts.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Chunk {} attempt {}/{} via {} at {}",
                chunk.index,
                attempt,
                max_attempts,
                self.provider.name(),
                endpoint
            );

            let outcome = match tokio::time::timeout(
                self.policy.timeout,
                self.provider.translate(&endpoint, &request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    millis: self.policy.timeout.as_millis() as u64,
                }),
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(e) => {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Chunk {} attempt {}/{} failed on {}: {}",
                        chunk.index, attempt, max_attempts, endpoint, e
                    );
                    let next = self.pool.rotate();
                    last_error = e;

                    if attempt < max_attempts {
                        self.reporter.status(&format!(
                            "Backend {} failed, retrying chunk {} with {} ({}/{})",
                            endpoint,
                            chunk.index + 1,
                            next,
                            attempt + 1,
                            max_attempts
                        ));
                        if !self.policy.backoff.is_zero() {
                            tokio::time::sleep(self.policy.backoff).await;
                        }
                    } else {
                        self.reporter.status(&format!(
                            "Backend {} failed, switched to {}",
                            endpoint, next
                        ));
                    }
                }
            }
        }

        error!(
            "Chunk {} failed after {} attempts: {}",
            chunk.index, max_attempts, last_error
        );
        Err(TranslationError::RetriesExhausted {
            chunk_index: chunk.index,
            attempts: max_attempts,
            last_error,
        })
    }
}
