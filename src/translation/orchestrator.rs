/*!
 * Pipeline orchestrator for translating a whole document.
 *
 * The orchestrator chunks the extracted text, dispatches chunks strictly in
 * order through the translation client and reassembles the results:
 * 1. Chunking with the configured strategy
 * 2. Sequential translation, aborting on the first exhausted chunk
 * 3. Reassembly with each chunk's original separator
 */

use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::PipelineError;
use crate::translation::backend_pool::BackendPool;
use crate::translation::chunker::{self, ChunkStrategy};
use crate::translation::client::TranslationClient;
use crate::translation::progress::{NoopReporter, ProgressReporter};

/// Shared flag for cooperative cancellation between chunks
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect before the next chunk
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Statistics of one document run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Chunks produced by the chunker
    pub total_chunks: usize,
    /// Chunks sent to a backend
    pub translated_chunks: usize,
    /// Blank chunks answered locally
    pub skipped_chunks: usize,
    /// Backend calls made, including failed ones
    pub attempts: u64,
    /// Failed backend calls
    pub failures: u64,
    /// Wall time of the run
    pub duration: Duration,
}

impl RunStats {
    /// Get a one-line summary of the run
    pub fn summary(&self) -> String {
        format!(
            "{} chunks ({} translated, {} blank) | {} calls, {} failed | {:.2}s",
            self.total_chunks,
            self.translated_chunks,
            self.skipped_chunks,
            self.attempts,
            self.failures,
            self.duration.as_secs_f32()
        )
    }
}

/// The main translation pipeline orchestrator
#[derive(Debug)]
pub struct TranslationPipeline {
    client: TranslationClient,
    strategy: ChunkStrategy,
    reporter: Arc<dyn ProgressReporter>,
    cancellation: CancellationFlag,
}

impl TranslationPipeline {
    /// Create a pipeline with a silent reporter
    pub fn new(client: TranslationClient, strategy: ChunkStrategy) -> Self {
        Self {
            client,
            strategy,
            reporter: Arc::new(NoopReporter),
            cancellation: CancellationFlag::new(),
        }
    }

    /// Send progress and retry status to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.client = self.client.with_reporter(Arc::clone(&reporter));
        self.reporter = reporter;
        self
    }

    /// Observe an externally owned cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Handle for cancelling this pipeline
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Backend pool shared with the client
    pub fn pool(&self) -> &Arc<BackendPool> {
        self.client.pool()
    }

    /// Chunking strategy in use
    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// Translate a document's text
    ///
    /// Empty input yields an empty string without any backend call.
    pub async fn translate_document(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, PipelineError> {
        self.translate_document_with_stats(text, source_language, target_language)
            .await
            .map(|(translated, _)| translated)
    }

    /// Translate a document's text and return run statistics
    pub async fn translate_document_with_stats(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<(String, RunStats), PipelineError> {
        let start_time = Instant::now();
        let before = self.client.stats();

        let chunks = chunker::split_into_chunks(text, self.strategy);
        let total = chunks.len();
        let mut stats = RunStats {
            total_chunks: total,
            ..Default::default()
        };

        if total == 0 {
            debug!("Nothing to translate");
            self.reporter.status("Translation complete!");
            return Ok((String::new(), stats));
        }

        info!(
            "Translating {} chunks ({:?}) from {} to {} via {}",
            total,
            self.strategy,
            source_language,
            target_language,
            self.client.provider_name()
        );

        let mut outputs: Vec<String> = Vec::with_capacity(total);
        for chunk in &chunks {
            if self.cancellation.is_cancelled() {
                info!("Translation cancelled after {}/{} chunks", chunk.index, total);
                return Err(PipelineError::Cancelled {
                    completed: chunk.index,
                    total,
                });
            }

            self.reporter
                .status(&format!("Translating chunk {}/{}", chunk.index + 1, total));

            let result = self
                .client
                .translate_chunk(chunk, source_language, target_language)
                .await;

            // Report terminal failures too, so the bar reflects where it stopped
            self.reporter.report(chunk.index + 1, total);

            let translated = result?;
            if chunk.is_blank() {
                stats.skipped_chunks += 1;
            } else {
                stats.translated_chunks += 1;
            }
            outputs.push(translated);
        }

        self.reporter.status("Translation complete!");

        let after = self.client.stats();
        stats.attempts = after.attempts - before.attempts;
        stats.failures = after.failures - before.failures;
        stats.duration = start_time.elapsed();
        info!("Translation finished: {}", stats.summary());

        Ok((chunker::reassemble(&chunks, &outputs), stats))
    }
}
