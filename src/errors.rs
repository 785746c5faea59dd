/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for the different stages of a
 * document run, using the thiserror crate for ergonomic error definitions.
 * Single-attempt provider failures are absorbed by the retry loop; only
 * extraction errors and exhausted retries cross component boundaries.
 */

use thiserror::Error;

/// Errors from a single attempt against a translation backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when building or sending an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The call did not finish within the per-call timeout
    #[error("Request timed out after {millis}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds
        millis: u64,
    },

    /// The backend cannot translate this language pair
    #[error("Unsupported language pair: {source_language} -> {target_language}")]
    UnsupportedLanguagePair {
        source_language: String,
        target_language: String,
    },
}

/// Errors raised while turning an uploaded document into text
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The file extension is not one of pdf, docx or txt
    #[error("Unsupported file format '{extension}'. Please provide a PDF, DOCX, or TXT file")]
    UnsupportedFormat {
        /// Extension as found on the file, lowercased (empty if missing)
        extension: String,
    },

    /// The document could not be parsed
    #[error("Failed to extract text from {format} document: {message}")]
    Malformed {
        /// Declared document format
        format: String,
        /// Underlying parser message
        message: String,
    },

    /// Reading the document failed
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while translating a single chunk
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// Every attempt failed; carries the error of the final attempt
    #[error("Chunk {chunk_index} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// 0-based index of the failed chunk
        chunk_index: usize,
        /// Number of attempts made
        attempts: u32,
        /// Error from the last attempt
        last_error: ProviderError,
    },
}

impl TranslationError {
    /// Index of the chunk that failed
    pub fn chunk_index(&self) -> usize {
        match self {
            Self::RetriesExhausted { chunk_index, .. } => *chunk_index,
        }
    }
}

/// Errors that abort a whole document run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A chunk could not be translated; no partial output is produced
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The run was cancelled between chunks
    #[error("Translation cancelled after {completed} of {total} chunks")]
    Cancelled {
        completed: usize,
        total: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction stage failed
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Translation stage failed
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Output serialization failed
    #[error("Output error: {0}")]
    Output(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Name of the stage that failed, for user-facing reports
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Extraction(_) => "extraction",
            Self::Pipeline(_) => "translation",
            Self::Output(_) | Self::File(_) => "output",
            Self::Unknown(_) => "unknown",
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<TranslationError> for AppError {
    fn from(error: TranslationError) -> Self {
        Self::Pipeline(PipelineError::Translation(error))
    }
}
