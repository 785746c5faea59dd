/*!
 * Tests for the sequential document pipeline
 */

use std::sync::Arc;

use doctrans::errors::{PipelineError, TranslationError};
use doctrans::providers::mock::MockProvider;
use doctrans::translation::{CancellationFlag, ChunkStrategy};

use crate::common::{self, ProgressEvent, RecordingReporter};

/// Output order follows chunk order even when later chunks need retries
#[tokio::test]
async fn test_translate_document_with_retries_should_keep_chunk_order() {
    common::init_logger();

    // Every third call fails, so chunks 2 and 4 each need one retry
    let provider = Arc::new(MockProvider::intermittent(3));
    let pool = common::endpoint_pool(3);
    let pipeline = common::build_pipeline(
        provider.clone(),
        pool.clone(),
        common::fast_policy(2),
        ChunkStrategy::Lines { max_chars: 4 },
    );

    let output = pipeline
        .translate_document("uno\ndos\ntres\nseis\nsol", "es", "en")
        .await
        .unwrap();

    assert_eq!(output, "[EN] uno\n[EN] dos\n[EN] tres\n[EN] seis\n[EN] sol");
    assert_eq!(provider.call_count(), 7);
    // One rotation per failed call
    assert_eq!(pool.current_index(), 2);
}

/// Chunk texts reach the backend in document order
#[tokio::test]
async fn test_translate_document_should_dispatch_sequentially() {
    let provider = Arc::new(MockProvider::working());
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(1),
        common::fast_policy(0),
        ChunkStrategy::Lines { max_chars: 5 },
    );

    pipeline.translate_document("uno\ndos\ntres", "es", "en").await.unwrap();

    let texts: Vec<String> = provider.calls().into_iter().map(|c| c.text).collect();
    assert_eq!(texts, vec!["uno", "dos", "tres"]);
}

/// A chunk that exhausts its retries aborts the run with its index
#[tokio::test]
async fn test_translate_document_should_abort_on_first_exhausted_chunk() {
    // Every second call fails and no retries are allowed
    let provider = Arc::new(MockProvider::intermittent(2).with_custom_response(common::dictionary_translate));
    let reporter = RecordingReporter::new();
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(2),
        common::fast_policy(0),
        ChunkStrategy::Lines { max_chars: 10 },
    )
    .with_reporter(reporter.clone());

    let err = pipeline
        .translate_document("Hola mundo\nComo estas\nAdios", "es", "en")
        .await
        .unwrap_err();

    match err {
        PipelineError::Translation(e) => assert_eq!(e.chunk_index(), 1),
        other => panic!("unexpected error: {:?}", other),
    }
    // Progress still records where the run stopped
    assert_eq!(reporter.progress(), vec![(1, 3), (2, 3)]);
    assert!(!reporter.statuses().contains(&"Translation complete!".to_string()));
    // No chunk after the failed one is dispatched
    assert_eq!(provider.call_count(), 2);
}

/// Progress is reported once per chunk with a fixed total
#[tokio::test]
async fn test_translate_document_should_report_progress_per_chunk() {
    let reporter = RecordingReporter::new();
    let pipeline = common::build_pipeline(
        Arc::new(MockProvider::working()),
        common::endpoint_pool(1),
        common::fast_policy(0),
        ChunkStrategy::Lines { max_chars: 4 },
    )
    .with_reporter(reporter.clone());

    pipeline.translate_document("uno\ndos\ntres", "es", "en").await.unwrap();

    assert_eq!(reporter.progress(), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(
        reporter.events().first(),
        Some(&ProgressEvent::Status("Translating chunk 1/3".to_string()))
    );
    assert_eq!(
        reporter.events().last(),
        Some(&ProgressEvent::Status("Translation complete!".to_string()))
    );
}

/// Cancellation takes effect between chunks
#[tokio::test]
async fn test_translate_document_cancelled_mid_run_should_stop_before_next_chunk() {
    let provider = Arc::new(MockProvider::working());
    let flag = CancellationFlag::new();
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(1),
        common::fast_policy(0),
        ChunkStrategy::Lines { max_chars: 4 },
    )
    .with_reporter(Arc::new(CancelAfterFirst { flag: flag.clone() }))
    .with_cancellation(flag);

    let err = pipeline.translate_document("uno\ndos\ntres", "es", "en").await.unwrap_err();

    assert_eq!(err, PipelineError::Cancelled { completed: 1, total: 3 });
    assert_eq!(provider.call_count(), 1);
}

/// Separator-only documents are reproduced without any backend call
#[tokio::test]
async fn test_translate_document_with_blank_lines_only_should_not_call_backend() {
    let provider = Arc::new(MockProvider::failing());
    let pipeline = common::build_pipeline(
        provider.clone(),
        common::endpoint_pool(1),
        common::fast_policy(2),
        ChunkStrategy::Lines { max_chars: 1 },
    );

    let (output, stats) = pipeline
        .translate_document_with_stats("\n \n", "es", "en")
        .await
        .unwrap();

    assert_eq!(output, "\n\n");
    assert_eq!(provider.call_count(), 0);
    assert_eq!(stats.translated_chunks, 0);
    assert_eq!(stats.skipped_chunks, stats.total_chunks);
}

/// Run statistics count failed calls as well as successful ones
#[tokio::test]
async fn test_translate_document_with_stats_should_count_failures() {
    let provider = Arc::new(MockProvider::fail_first(1));
    let pipeline = common::build_pipeline(
        provider,
        common::endpoint_pool(2),
        common::fast_policy(2),
        ChunkStrategy::default(),
    );

    let (_, stats) = pipeline
        .translate_document_with_stats("Hola mundo", "es", "en")
        .await
        .unwrap();

    assert_eq!(stats.total_chunks, 1);
    assert_eq!(stats.attempts, 2);
    assert_eq!(stats.failures, 1);
    assert!(stats.summary().starts_with("1 chunks (1 translated, 0 blank)"));
}

/// Errors expose the failing chunk for fail-fast reporting
#[test]
fn test_pipeline_error_should_wrap_translation_error() {
    let err: PipelineError = TranslationError::RetriesExhausted {
        chunk_index: 4,
        attempts: 3,
        last_error: doctrans::errors::ProviderError::ConnectionError("refused".to_string()),
    }
    .into();

    assert!(err.to_string().contains("Chunk 4 failed after 3 attempts"));
}

// Reporter that requests cancellation once the first chunk is done
#[derive(Debug)]
struct CancelAfterFirst {
    flag: CancellationFlag,
}

impl doctrans::translation::ProgressReporter for CancelAfterFirst {
    fn report(&self, current: usize, _total: usize) {
        if current == 1 {
            self.flag.cancel();
        }
    }

    fn status(&self, _message: &str) {}
}
