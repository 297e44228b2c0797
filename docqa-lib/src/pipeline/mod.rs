//! Upload and processing driver
//!
//! ```text
//! upload -> extract -> require text -> chunk -> embed -> append to store
//! ```
//!
//! A failing file is reported and skipped; the rest of a directory is
//! still processed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::chunk::{ChunkMetadata, Chunker};
use crate::embed::Embedder;
use crate::extract::{file_name, PdfExtractor, TextExtractor};
use crate::search::SearchEngine;
use crate::store::VectorStore;
use crate::{Error, Result};

/// Outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub name: String,
    pub characters: usize,
    pub chunks: usize,
}

/// Outcome of processing a directory.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub processed: Vec<DocumentSummary>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl IngestReport {
    /// Total chunks appended across all processed documents.
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.processed.iter().map(|d| d.chunks).sum()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives documents through extraction, chunking and indexing.
pub struct Ingestor<C: Chunker, E: Embedder, S: VectorStore> {
    extractor: PdfExtractor,
    chunker: C,
    engine: SearchEngine<E, S>,
}

impl<C: Chunker, E: Embedder, S: VectorStore> Ingestor<C, E, S> {
    #[must_use]
    pub fn new(chunker: C, engine: SearchEngine<E, S>) -> Self {
        Self {
            extractor: PdfExtractor::new(),
            chunker,
            engine,
        }
    }

    /// Extract, chunk and index a single PDF.
    ///
    /// Errors are wrapped in [`Error::Processing`] naming the file.
    pub fn process_file(&mut self, path: &Path) -> Result<DocumentSummary> {
        self.index_file(path).map_err(|e| Error::Processing {
            file: file_name(path),
            source: Box::new(e),
        })
    }

    fn index_file(&mut self, path: &Path) -> Result<DocumentSummary> {
        info!("Processing document: {}", path.display());
        let document = self.extractor.extract(path)?;
        let text = document.require_text()?;
        let characters = text.chars().count();

        let chunks = self
            .chunker
            .chunk(text, ChunkMetadata::for_source(document.name.clone()));
        info!(chunks = chunks.len(), strategy = self.chunker.name(), "split document");

        let added = self.engine.add(&chunks)?;
        info!(added, total = self.engine.len(), "stored embeddings");

        Ok(DocumentSummary {
            name: document.name,
            characters,
            chunks: added,
        })
    }

    /// Process every PDF directly inside `dir`, in file-name order.
    ///
    /// Every call re-indexes every PDF, so files already processed get
    /// duplicate records.
    pub fn process_directory(&mut self, dir: &Path) -> Result<IngestReport> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && self.extractor.can_extract(p))
            .collect();
        paths.sort();

        let mut report = IngestReport::default();
        for path in paths {
            match self.process_file(&path) {
                Ok(summary) => report.processed.push(summary),
                Err(e) => {
                    warn!("{e}");
                    report.failed.push((path, e));
                }
            }
        }

        info!(
            processed = report.processed.len(),
            failed = report.failed.len(),
            "finished processing {}",
            dir.display()
        );
        Ok(report)
    }

    /// Returns the underlying search engine.
    #[must_use]
    pub fn engine(&self) -> &SearchEngine<E, S> {
        &self.engine
    }
}

/// Copy the PDF at `src` into `upload_dir`, creating the directory.
///
/// Returns the path of the copy.
pub fn upload(src: &Path, upload_dir: &Path) -> Result<PathBuf> {
    if !PdfExtractor::new().can_extract(src) {
        return Err(Error::InvalidInput(format!("{} is not a PDF file", src.display())));
    }
    let name = src
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("{} has no file name", src.display())))?;

    if !src.is_file() {
        return Err(Error::InvalidInput(format!("{} does not exist or is not a file", src.display())));
    }

    fs::create_dir_all(upload_dir)?;
    let dest = upload_dir.join(name);
    if Some(fs::canonicalize(src)?) != fs::canonicalize(&dest).ok() {
        fs::copy(src, &dest)?;
    }
    info!("uploaded {} to {}", src.display(), dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::FixedSizeChunker;
    use crate::embed::HashingEmbedder;
    use crate::store::MemoryStore;
    use tempfile::tempdir;

    fn ingestor() -> Ingestor<FixedSizeChunker, HashingEmbedder, MemoryStore> {
        Ingestor::new(
            FixedSizeChunker::default(),
            SearchEngine::new(HashingEmbedder::new(), MemoryStore::new()),
        )
    }

    #[test]
    fn test_upload_copies_pdf() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("doc.pdf");
        fs::write(&src, b"%PDF-1.5").unwrap();

        let dest = upload(&src, &dir.path().join("pdfs")).unwrap();
        assert_eq!(dest, dir.path().join("pdfs").join("doc.pdf"));
        assert_eq!(fs::read(dest).unwrap(), b"%PDF-1.5");
    }

    #[test]
    fn test_upload_into_own_directory() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("doc.pdf");
        fs::write(&src, b"%PDF-1.5").unwrap();

        assert_eq!(upload(&src, dir.path()).unwrap(), src);
        assert_eq!(fs::read(&src).unwrap(), b"%PDF-1.5");
    }

    #[test]
    fn test_upload_missing_source() {
        let dir = tempdir().unwrap();
        let upload_dir = dir.path().join("pdfs");

        let err = upload(&dir.path().join("missing.pdf"), &upload_dir).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!upload_dir.join("missing.pdf").exists());
    }

    #[test]
    fn test_upload_rejects_non_pdf() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("notes.txt");
        fs::write(&src, "hello").unwrap();

        assert!(matches!(upload(&src, dir.path()), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_process_file_wraps_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a pdf").unwrap();

        let err = ingestor().process_file(&path).unwrap_err();
        match err {
            Error::Processing { file, source } => {
                assert_eq!(file, "broken.pdf");
                assert!(matches!(*source, Error::Extraction(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_process_directory_skips_other_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a pdf").unwrap();

        let mut ingestor = ingestor();
        let report = ingestor.process_directory(dir.path()).unwrap();

        assert!(report.processed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, dir.path().join("broken.pdf"));
        assert!(!report.is_success());
        assert!(ingestor.engine().is_empty());
    }

    #[test]
    fn test_process_missing_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ingestor().process_directory(&dir.path().join("missing")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let report = ingestor().process_directory(dir.path()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.total_chunks(), 0);
    }
}
