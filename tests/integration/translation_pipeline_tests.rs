/*!
 * End-to-end pipeline scenarios with scripted backends
 */

use std::sync::Arc;
use std::time::Duration;

use doctrans::errors::{PipelineError, ProviderError, TranslationError};
use doctrans::providers::libretranslate::LibreTranslate;
use doctrans::providers::mock::MockProvider;
use doctrans::translation::{BackendPool, ChunkStrategy, RetryPolicy, TranslationClient, TranslationPipeline};

use crate::common::{self, RecordingReporter, StubServer};

/// A short document fits in one chunk and is translated line by line
#[tokio::test]
async fn test_single_chunk_document_should_translate_in_one_call() {
    common::init_logger();
    let provider = Arc::new(MockProvider::working().with_custom_response(common::dictionary_translate));
    let reporter = RecordingReporter::new();
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(1),
        common::fast_policy(2),
        ChunkStrategy::default(),
    )
    .with_reporter(reporter.clone());

    let output = pipeline.translate_document("Hola mundo\nComo estas", "es", "en").await.unwrap();

    assert_eq!(output, "Hello world\nHow are you");
    assert_eq!(provider.call_count(), 1);
    assert_eq!(reporter.progress(), vec![(1, 1)]);
}

/// A hung backend times out, the next one answers, and order is kept
#[tokio::test]
async fn test_hung_first_backend_should_fail_over_and_keep_order() {
    let provider = Arc::new(
        MockProvider::working()
            .with_custom_response(common::dictionary_translate)
            .slow_on(&common::endpoint_url(0), 5_000),
    );
    let pool = common::endpoint_pool(2);
    let pipeline = common::build_pipeline(
        provider.clone(),
        pool.clone(),
        common::fast_policy(2),
        ChunkStrategy::Lines { max_chars: 10 },
    );

    let output = pipeline.translate_document("Hola mundo\nComo estas", "es", "en").await.unwrap();

    assert_eq!(output, "Hello world\nHow are you");
    // The second chunk starts on the backend that worked
    assert_eq!(pool.current_index(), 1);
    assert_eq!(
        provider.called_endpoints(),
        vec![common::endpoint_url(0), common::endpoint_url(1), common::endpoint_url(1)]
    );
}

/// A whitespace-only chunk is answered locally with an empty string
#[tokio::test]
async fn test_whitespace_chunk_should_not_reach_backend() {
    let provider = Arc::new(MockProvider::working().with_custom_response(common::dictionary_translate));
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(1),
        common::fast_policy(0),
        ChunkStrategy::Lines { max_chars: 5 },
    );

    let output = pipeline.translate_document("Adios\n   \nAdios", "es", "en").await.unwrap();

    assert_eq!(output, "Goodbye\n\nGoodbye");
    let texts: Vec<String> = provider.calls().into_iter().map(|c| c.text).collect();
    assert_eq!(texts, vec!["Adios", "Adios"]);
}

#[tokio::test]
async fn test_empty_document_should_not_call_backend() {
    let provider = Arc::new(MockProvider::failing());
    let reporter = RecordingReporter::new();
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(1),
        common::fast_policy(2),
        ChunkStrategy::default(),
    )
    .with_reporter(reporter.clone());

    assert_eq!(pipeline.translate_document("", "es", "en").await.unwrap(), "");
    assert_eq!(provider.call_count(), 0);
    assert!(reporter.progress().is_empty());
}

/// Every backend failing aborts the document with no partial result
#[tokio::test]
async fn test_all_backends_failing_should_abort_document() {
    let provider = Arc::new(MockProvider::failing());
    let pool = common::endpoint_pool(3);
    let pipeline = common::build_pipeline(
        provider.clone(),
        pool.clone(),
        common::fast_policy(2),
        ChunkStrategy::Lines { max_chars: 10 },
    );

    let result = pipeline.translate_document("Hola mundo\nComo estas", "es", "en").await;

    assert_eq!(
        result,
        Err(PipelineError::Translation(TranslationError::RetriesExhausted {
            chunk_index: 0,
            attempts: 3,
            last_error: ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            },
        }))
    );
    // Three failed attempts walked the whole ring
    assert_eq!(pool.current_index(), 0);
    assert_eq!(provider.call_count(), 3);
}

/// Rotation state carries over from one chunk to the next
#[tokio::test]
async fn test_rotation_should_persist_across_chunks() {
    // The first chunk needs two rotations; later chunks start where it ended
    let provider = Arc::new(MockProvider::fail_first(2));
    let pool = common::endpoint_pool(3);
    let pipeline = common::build_pipeline(
        provider.clone(),
        pool.clone(),
        common::fast_policy(2),
        ChunkStrategy::Lines { max_chars: 5 },
    );

    pipeline.translate_document("uno\ndos\ntres", "es", "en").await.unwrap();

    assert_eq!(
        provider.called_endpoints(),
        vec![
            common::endpoint_url(0),
            common::endpoint_url(1),
            common::endpoint_url(2),
            common::endpoint_url(2),
            common::endpoint_url(2),
        ]
    );
    assert_eq!(pool.current_index(), 2);
}

/// A full document through the HTTP provider and a stub service
#[tokio::test]
async fn test_pipeline_over_http_should_translate_each_chunk() {
    let server = StubServer::start(200, r#"{"translatedText": "Translated"}"#).await;
    let pool = Arc::new(BackendPool::from_urls(&[server.url.as_str()]).unwrap());
    let policy = RetryPolicy {
        max_retries: 0,
        backoff: Duration::ZERO,
        timeout: Duration::from_secs(5),
    };
    let client = TranslationClient::new(Arc::new(LibreTranslate::new(policy.timeout)), pool, policy);
    let pipeline = TranslationPipeline::new(client, ChunkStrategy::Lines { max_chars: 10 });

    let output = pipeline
        .translate_document("Hola mundo\nComo estas\nAdios", "es", "en")
        .await
        .unwrap();

    assert_eq!(output, "Translated\nTranslated\nTranslated");
    let queries: Vec<String> = server
        .requests()
        .iter()
        .map(|r| serde_json::from_str::<serde_json::Value>(&r.body).unwrap()["q"].to_string())
        .collect();
    assert_eq!(queries, vec!["\"Hola mundo\"", "\"Como estas\"", "\"Adios\""]);
}
