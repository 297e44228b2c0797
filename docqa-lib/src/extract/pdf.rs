use std::fs;
use std::path::Path;

use tracing::debug;

use crate::extract::{file_name, Document, TextExtractor};
use crate::{Error, Result};

/// Extractor for PDF files.
///
/// Uses lopdf to decode the text of every page, in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn can_extract(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }

    fn extract(&self, path: &Path) -> Result<Document> {
        debug!("Extracting PDF: {:?}", path);

        let bytes = fs::read(path)
            .map_err(|e| Error::Extraction(format!("cannot read {}: {e}", path.display())))?;
        let text = extract_pdf_text(&bytes)?;

        Ok(Document {
            name: file_name(path),
            bytes,
            text,
        })
    }
}

/// Extract the text of every page from PDF bytes, pages joined by `\n`.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| Error::Extraction(format!("invalid PDF: {e}")))?;

    let pages = doc.get_pages();
    let mut texts = Vec::with_capacity(pages.len());
    for page_num in pages.keys() {
        let text = doc
            .extract_text(&[*page_num])
            .map_err(|e| Error::Extraction(format!("page {page_num}: {e}")))?;
        texts.push(text);
    }

    let text = texts.join("\n");
    debug!("Extracted {} pages, {} chars", texts.len(), text.chars().count());
    Ok(text)
}
