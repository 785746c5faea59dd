/*!
 * Chunked document translation with multi-backend failover.
 *
 * This module contains the core of a document run. It is split into several
 * submodules:
 *
 * - `chunker`: Splitting text into bounded chunks and reassembling results
 * - `backend_pool`: Cyclic ring of translation endpoints
 * - `client`: Per-chunk translation with retries and rotation
 * - `orchestrator`: Sequential, fail-fast document pipeline
 * - `progress`: Progress reporting sinks
 */

// Re-export main types for easier usage
pub use self::backend_pool::{BackendEndpoint, BackendPool};
pub use self::chunker::{Chunk, ChunkStrategy};
pub use self::client::{ClientStats, RetryPolicy, TranslationClient};
pub use self::orchestrator::{CancellationFlag, RunStats, TranslationPipeline};
pub use self::progress::{LogReporter, NoopReporter, ProgressBarReporter, ProgressReporter};

// Submodules
pub mod backend_pool;
pub mod chunker;
pub mod client;
pub mod orchestrator;
pub mod progress;
