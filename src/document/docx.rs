/*!
 * Text extraction from Word (.docx) documents.
 *
 * A .docx file is a ZIP package; the body lives in `word/document.xml`.
 * Each `<w:p>` paragraph becomes one line built from the `<w:t>` runs inside
 * it. Tabs and line breaks inside runs are kept as `\t` and `\n`.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::{Cursor, Read};

use crate::errors::ExtractionError;

const FORMAT: &str = "DOCX";

/// Path of the main document part inside the package
pub const DOCUMENT_PART: &str = "word/document.xml";

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][\w.\-]*(?::[\w.\-]+)?)((?:[^>/]|/[^>])*)(/?)>")
        .unwrap()
});

static ENTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|lt|gt|amp|quot|apos);")
        .unwrap()
});

fn malformed(message: impl ToString) -> ExtractionError {
    ExtractionError::Malformed {
        format: FORMAT.to_string(),
        message: message.to_string(),
    }
}

/// Extract paragraph text from a .docx package
pub fn extract_text(content: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content)).map_err(malformed)?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| malformed(format!("{}: {}", DOCUMENT_PART, e)))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(malformed)?;

    Ok(paragraphs_from_xml(&xml))
}

/// Turn WordprocessingML body XML into text, one line per paragraph
pub fn paragraphs_from_xml(xml: &str) -> String {
    let mut output = String::new();
    let mut paragraph = String::new();
    let mut in_paragraph = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut last_end = 0;

    for caps in TAG_PATTERN.captures_iter(xml) {
        let Some(whole) = caps.get(0) else { continue };

        if in_text {
            paragraph.push_str(&decode_entities(&xml[last_end..whole.start()]));
        }
        last_end = whole.end();

        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();

        match (&caps[2], closing) {
            ("w:p", false) => {
                if self_closing {
                    output.push('\n');
                } else {
                    in_paragraph = true;
                    paragraph.clear();
                }
            }
            ("w:p", true) => {
                if in_paragraph {
                    output.push_str(&paragraph);
                    output.push('\n');
                }
                in_paragraph = false;
                in_run = false;
                in_text = false;
                paragraph.clear();
            }
            ("w:r", false) => in_run = !self_closing,
            ("w:r", true) => {
                in_run = false;
                in_text = false;
            }
            ("w:t", false) => in_text = in_run && !self_closing,
            ("w:t", true) => in_text = false,
            // Tab stops inside paragraph properties are not runs
            ("w:tab", false) if in_run => paragraph.push('\t'),
            ("w:br", false) | ("w:cr", false) if in_run => paragraph.push('\n'),
            _ => {}
        }
    }

    output
}

/// Decode the predefined XML entities and numeric character references
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY_PATTERN
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if entity.starts_with("#x") => u32::from_str_radix(&entity[2..], 16)
                    .ok()
                    .and_then(char::from_u32),
                _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
            };
            decoded
                .map(|c| c.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
