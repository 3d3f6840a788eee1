//! PDF text acquisition using lopdf and pdf-extract.

use std::fs;
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::AcquireError;

/// Read a PDF file from disk and return its text layer.
///
/// Newlines are flattened to spaces so that labels and values split
/// across line breaks stay matchable by the field patterns.
pub fn read_text(path: &Path) -> Result<String, AcquireError> {
    let data = fs::read(path).map_err(|e| AcquireError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    extract_text(&data)
}

/// Extract the text layer from in-memory PDF bytes.
///
/// Empty text is not an error here: a text-free document surfaces later
/// as an empty field map.
pub fn extract_text(data: &[u8]) -> Result<String, AcquireError> {
    let mut doc = Document::load_mem(data).map_err(|e| AcquireError::PdfParse(e.to_string()))?;

    // Handle PDFs with empty password encryption
    let raw_data = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(AcquireError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        // pdf_extract needs the decrypted bytes, not the original stream
        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| AcquireError::PdfParse(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(AcquireError::NoPages);
    }
    debug!("Loaded PDF with {} pages", page_count);

    let text = pdf_extract::extract_text_from_mem(&raw_data)
        .map_err(|e| AcquireError::TextExtraction(e.to_string()))?;

    Ok(flatten(&text))
}

/// Collapse line breaks into spaces and trim the edges.
fn flatten(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}
