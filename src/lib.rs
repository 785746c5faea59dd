/*!
 * # doctrans - document translation to English
 *
 * A Rust library for translating PDF, DOCX and plain text documents to
 * English through one or more translation backends.
 *
 * ## Features
 *
 * - Extract text from PDF, DOCX and TXT documents
 * - Split text into bounded chunks (by lines, words or fixed windows)
 * - Translate chunks through:
 *   - LibreTranslate-compatible HTTP services
 *   - A local model served by Ollama (Spanish and Chinese to English)
 * - Retry failed chunks with a fixed backoff, rotating across a ring of endpoints
 * - Fail fast: a chunk that exhausts its retries aborts the document
 * - Write the result as TXT or DOCX
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Text extraction and output serialization
 * - `translation`: The chunked translation pipeline:
 *   - `translation::chunker`: Chunk splitting and reassembly
 *   - `translation::backend_pool`: Cyclic endpoint ring
 *   - `translation::client`: Per-chunk retries and rotation
 *   - `translation::orchestrator`: Sequential document pipeline
 *   - `translation::progress`: Progress reporters
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Backend clients:
 *   - `providers::libretranslate`: Remote HTTP client
 *   - `providers::ollama`: Local model client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use document::{Document, DocumentFormat};
pub use errors::{AppError, ExtractionError, PipelineError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_source_language};
pub use translation::{BackendPool, Chunk, ChunkStrategy, TranslationClient, TranslationPipeline};
