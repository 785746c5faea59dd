/*!
 * Tests for per-chunk retries and backend rotation
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use doctrans::errors::{ProviderError, TranslationError};
use doctrans::providers::mock::MockProvider;
use doctrans::translation::chunker::{split_into_chunks, Chunk};
use doctrans::translation::{ChunkStrategy, RetryPolicy, TranslationClient};

use crate::common::{self, RecordingReporter};

fn single_chunk(text: &str) -> Chunk {
    split_into_chunks(text, ChunkStrategy::default())
        .into_iter()
        .next()
        .unwrap()
}

/// Attempts and rotations both equal max_retries + 1 when every call fails
#[tokio::test]
async fn test_translate_chunk_when_all_fail_should_rotate_once_per_attempt() {
    common::init_logger();

    for max_retries in 0..4u32 {
        let provider = Arc::new(MockProvider::failing());
        let pool = common::endpoint_pool(5);
        let client = TranslationClient::new(provider.clone(), pool.clone(), common::fast_policy(max_retries));

        let result = client.translate_chunk(&single_chunk("Hola"), "es", "en").await;

        let expected = (max_retries + 1) as usize;
        assert!(matches!(
            result,
            Err(TranslationError::RetriesExhausted { attempts, .. }) if attempts == max_retries + 1
        ));
        assert_eq!(provider.call_count(), expected);
        assert_eq!(pool.current_index(), expected % pool.len());

        // Each attempt went to the next endpoint in the ring
        let expected_endpoints: Vec<String> = (0..expected).map(|i| common::endpoint_url(i % 5)).collect();
        assert_eq!(provider.called_endpoints(), expected_endpoints);
    }
}

/// The last attempt's error is the one reported
#[tokio::test]
async fn test_translate_chunk_should_report_last_error() {
    let provider = Arc::new(MockProvider::failing().failing_on(&common::endpoint_url(1)));
    let client = TranslationClient::new(provider, common::endpoint_pool(2), common::fast_policy(1));

    let err = client.translate_chunk(&single_chunk("Hola"), "es", "en").await.unwrap_err();
    match err {
        TranslationError::RetriesExhausted { last_error, .. } => {
            // Second attempt hit backend-1, which fails with 503
            assert_eq!(
                last_error,
                ProviderError::ApiError {
                    status_code: 503,
                    message: format!("Simulated failure on {}", common::endpoint_url(1)),
                }
            );
        }
    }
}

/// Transient failures are absorbed within the retry budget
#[tokio::test]
async fn test_translate_chunk_with_transient_failures_should_recover() {
    let provider = Arc::new(MockProvider::fail_first(2));
    let pool = common::endpoint_pool(3);
    let client = TranslationClient::new(provider.clone(), pool.clone(), common::fast_policy(2));

    let text = client.translate_chunk(&single_chunk("Hola"), "es", "en").await.unwrap();

    assert_eq!(text, "[EN] Hola");
    assert_eq!(provider.call_count(), 3);
    assert_eq!(pool.current_index(), 2);
    assert_eq!(client.stats().attempts, 3);
    assert_eq!(client.stats().failures, 2);
}

/// One more failure than the budget allows is fatal
#[tokio::test]
async fn test_translate_chunk_with_too_many_failures_should_fail() {
    let provider = Arc::new(MockProvider::fail_first(3));
    let client = TranslationClient::new(provider.clone(), common::endpoint_pool(3), common::fast_policy(2));

    let err = client.translate_chunk(&single_chunk("Hola"), "es", "en").await.unwrap_err();
    assert_eq!(err.chunk_index(), 0);
    assert_eq!(provider.call_count(), 3);
}

/// Blank chunks never reach a backend
#[tokio::test]
async fn test_translate_chunk_with_whitespace_should_skip_backend() {
    let provider = Arc::new(MockProvider::failing());
    let pool = common::endpoint_pool(2);
    let client = TranslationClient::new(provider.clone(), pool.clone(), common::fast_policy(2));

    for text in [" ", "\n\n", "\t \r"] {
        let chunk = single_chunk(text);
        assert_eq!(client.translate_chunk(&chunk, "es", "en").await.unwrap(), "");
    }

    assert_eq!(provider.call_count(), 0);
    assert_eq!(pool.current_index(), 0);
    assert_eq!(client.stats().skipped, 3);
}

/// Request carries the source language through to the backend
#[tokio::test]
async fn test_translate_chunk_should_forward_source_language() {
    let provider = Arc::new(MockProvider::working());
    let client = TranslationClient::new(provider.clone(), common::endpoint_pool(1), common::fast_policy(0));

    client.translate_chunk(&single_chunk("你好"), "zh", "en").await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "你好");
    assert_eq!(calls[0].source_language, "zh");
}

/// A hung backend is abandoned after the per-call timeout
#[tokio::test]
async fn test_translate_chunk_should_abandon_hung_backend() {
    let provider = Arc::new(MockProvider::slow(10_000));
    let policy = RetryPolicy {
        max_retries: 0,
        backoff: Duration::ZERO,
        timeout: Duration::from_millis(50),
    };
    let client = TranslationClient::new(provider, common::endpoint_pool(1), policy);

    let start = Instant::now();
    let err = client.translate_chunk(&single_chunk("Hola"), "es", "en").await.unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(5));
    match err {
        TranslationError::RetriesExhausted { last_error, .. } => {
            assert_eq!(last_error, ProviderError::Timeout { millis: 50 });
        }
    }
}

/// Backoff is waited between attempts but not after the last one
#[tokio::test]
async fn test_translate_chunk_should_wait_fixed_backoff_between_attempts() {
    let provider = Arc::new(MockProvider::failing());
    let policy = RetryPolicy {
        max_retries: 2,
        backoff: Duration::from_millis(100),
        timeout: Duration::from_millis(250),
    };
    let client = TranslationClient::new(provider, common::endpoint_pool(2), policy);

    let start = Instant::now();
    assert!(client.translate_chunk(&single_chunk("Hola"), "es", "en").await.is_err());
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(200), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(300 + 250), "elapsed {:?}", elapsed);
}

/// Retry status messages name the failing and the next backend
#[tokio::test]
async fn test_translate_chunk_should_report_rotation_status() {
    let provider = Arc::new(MockProvider::working().failing_on(&common::endpoint_url(0)));
    let reporter = RecordingReporter::new();
    let client = TranslationClient::new(provider, common::endpoint_pool(2), common::fast_policy(2))
        .with_reporter(reporter.clone());

    client.translate_chunk(&single_chunk("Hola"), "es", "en").await.unwrap();

    let statuses = reporter.statuses();
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].contains(&common::endpoint_url(0)));
    assert!(statuses[0].contains(&common::endpoint_url(1)));
}

#[test]
fn test_default_retry_policy_should_allow_three_attempts() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 2);
    assert_eq!(policy.max_attempts(), 3);
    assert_eq!(policy.backoff, Duration::from_secs(1));
}
