/*!
 * Serialization of translated text into downloadable files.
 */

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::app_config::OutputFormat;
use crate::errors::AppError;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_FOOTER: &str = "<w:sectPr/></w:body></w:document>";

/// Encode text as UTF-8 bytes
pub fn serialize_as_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Build a minimal .docx package with one paragraph per non-blank line
pub fn serialize_as_docx(text: &str) -> Result<Vec<u8>, AppError> {
    let document_xml = document_xml(text);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", RELS_XML),
        ("word/document.xml", document_xml.as_str()),
    ] {
        writer
            .start_file(name, options)
            .map_err(|e| AppError::Output(format!("Failed to add {} to DOCX: {}", name, e)))?;
        writer
            .write_all(body.as_bytes())
            .map_err(|e| AppError::Output(format!("Failed to write {}: {}", name, e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| AppError::Output(format!("Failed to finish DOCX: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Serialize in the requested output format
pub fn serialize(text: &str, format: OutputFormat) -> Result<Vec<u8>, AppError> {
    match format {
        OutputFormat::Txt => Ok(serialize_as_text(text)),
        OutputFormat::Docx => serialize_as_docx(text),
    }
}

fn document_xml(text: &str) -> String {
    let mut xml = String::from(DOCUMENT_HEADER);
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        xml.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
        xml.push_str(&escape_xml(line));
        xml.push_str("</w:t></w:r></w:p>");
    }
    xml.push_str(DOCUMENT_FOOTER);
    xml
}

/// Escape text for use inside an XML element
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // Control characters other than tab are not allowed in XML 1.0
            c if c.is_control() && c != '\t' => {}
            c => escaped.push(c),
        }
    }
    escaped
}
