/*!
 * Documents and their conversion to and from plain text.
 *
 * - `pdf`: text extraction from PDF files (lopdf)
 * - `docx`: text extraction from Word documents (zip + WordprocessingML)
 * - `output`: serialization of translated text as `.txt` or `.docx`
 */

use bytes::Bytes;
use std::fmt;
use std::path::Path;

use crate::errors::ExtractionError;

pub mod docx;
pub mod output;
pub mod pdf;

pub use output::{serialize, serialize_as_docx, serialize_as_text};

/// Input formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Map a file extension, case-insensitively
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        let extension = extension.trim_start_matches('.').to_lowercase();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(ExtractionError::UnsupportedFormat { extension }),
        }
    }

    /// Detect the format from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let extension = path
            .as_ref()
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_extension(&extension)
    }

    /// Canonical extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    /// Whether `path` has one of the supported extensions
    pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
        Self::from_path(path).is_ok()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Txt => "TXT",
        };
        write!(f, "{}", name)
    }
}

/// Raw uploaded document: immutable bytes plus declared format
#[derive(Debug, Clone)]
pub struct Document {
    content: Bytes,
    format: DocumentFormat,
}

impl Document {
    pub fn new(content: impl Into<Bytes>, format: DocumentFormat) -> Self {
        Self {
            content: content.into(),
            format,
        }
    }

    /// Read a document from disk, detecting the format from its extension
    ///
    /// The format is checked before the file is read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let format = DocumentFormat::from_path(&path)?;
        let content = std::fs::read(path.as_ref())?;
        Ok(Self::new(content, format))
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Size of the raw content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Extract the text of a document, dispatching on its format
pub fn extract_text(document: &Document) -> Result<String, ExtractionError> {
    match document.format() {
        DocumentFormat::Txt => std::str::from_utf8(document.content())
            .map(str::to_string)
            .map_err(|e| ExtractionError::Malformed {
                format: DocumentFormat::Txt.to_string(),
                message: e.to_string(),
            }),
        DocumentFormat::Pdf => pdf::extract_text(document.content()),
        DocumentFormat::Docx => docx::extract_text(document.content()),
    }
}
