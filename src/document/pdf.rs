use log::{debug, warn};
use lopdf::Document as PdfDocument;

use crate::errors::ExtractionError;

const FORMAT: &str = "PDF";

fn malformed(message: impl ToString) -> ExtractionError {
    ExtractionError::Malformed {
        format: FORMAT.to_string(),
        message: message.to_string(),
    }
}

/// Extract the text of every page, in page order
///
/// Each page is followed by a blank line. Pages without extractable text
/// (scanned images) contribute only the blank line.
pub fn extract_text(content: &[u8]) -> Result<String, ExtractionError> {
    let document = PdfDocument::load_mem(content).map_err(malformed)?;

    if document.is_encrypted() {
        return Err(malformed("document is encrypted"));
    }

    let pages = document.get_pages();
    debug!("PDF has {} pages", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => page_texts.push(text),
            Err(e) => {
                warn!("No text extracted from page {}: {}", page_number, e);
                page_texts.push(String::new());
            }
        }
    }

    Ok(join_pages(&page_texts))
}

/// Join page texts, each followed by a blank line
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page.as_ref().trim_end());
        text.push_str("\n\n");
    }
    text
}
