//! Document text extraction
//!
//! An extractor turns a file on disk into a [`Document`]: its name, raw
//! bytes and plain text. Parse failures are [`Error::Extraction`]; a file
//! that parses but yields only whitespace is reported separately by
//! [`Document::require_text`] as [`Error::NoText`].

use std::path::Path;

use crate::{Error, Result};

/// A single uploaded file and the text extracted from it.
///
/// Documents are short-lived: once the text is chunked and indexed the
/// document is dropped.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name, used as the chunk source id
    pub name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Extracted text, pages joined by a line break
    pub text: String,
}

impl Document {
    /// Fail with [`Error::NoText`] if nothing but whitespace was extracted.
    pub fn require_text(&self) -> Result<&str> {
        if self.text.trim().is_empty() {
            return Err(Error::NoText(self.name.clone()));
        }
        Ok(&self.text)
    }
}

/// Trait for format-specific text extractors
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles `path`, judged by extension.
    fn can_extract(&self, path: &Path) -> bool;

    /// Read `path` and extract its text.
    fn extract(&self, path: &Path) -> Result<Document>;
}

/// File name component of `path`, or the whole path if it has none.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

mod pdf;

pub use pdf::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document {
            name: "doc.pdf".to_string(),
            bytes: Vec::new(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_require_text() {
        assert_eq!(doc("The sky is blue.\n").require_text().unwrap(), "The sky is blue.\n");
    }

    #[test]
    fn test_require_text_whitespace_only() {
        let err = doc(" \n\t\n").require_text().unwrap_err();
        assert!(matches!(err, Error::NoText(ref name) if name == "doc.pdf"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("pdfs/report.pdf")), "report.pdf");
    }
}
