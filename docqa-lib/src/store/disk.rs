//! Directory-backed persistent collection.
//!
//! Layout:
//!
//! ```text
//! <dir>/collection.json   model name and embedding dimension
//! <dir>/records.jsonl     one EmbeddingRecord per line, append-only
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{top_k, validate_batch, EmbeddingRecord, SearchResult, VectorStore};
use crate::{Error, Result};

const MANIFEST_FILE: &str = "collection.json";
const RECORDS_FILE: &str = "records.jsonl";

/// Describes which embedding function produced a collection's vectors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub model: String,
    pub dimension: usize,
}

/// Vector store persisted under a directory.
///
/// Records are loaded into memory on open and appended to disk on insert.
/// Writers are not coordinated: two processes appending at once may
/// interleave lines.
#[derive(Debug)]
pub struct DiskStore {
    dir: PathBuf,
    manifest: Manifest,
    records: Vec<EmbeddingRecord>,
}

impl DiskStore {
    /// Open an existing collection.
    ///
    /// Fails with [`Error::NotFound`] if nothing has been persisted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(Error::NotFound(format!(
                "vector store not found at {}; please process a document first",
                dir.display()
            )));
        }

        let manifest: Manifest = serde_json::from_reader(BufReader::new(File::open(&manifest_path)?))
            .map_err(|e| Error::Store(format!("corrupt {}: {e}", manifest_path.display())))?;
        let records = load_records(&dir.join(RECORDS_FILE), manifest.dimension)?;

        debug!(
            dir = %dir.display(),
            model = %manifest.model,
            records = records.len(),
            "opened collection"
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            records,
        })
    }

    /// Open the collection at `dir`, creating it for `model` if absent.
    ///
    /// An existing collection built with a different model or dimension is
    /// rejected rather than mixed.
    pub fn open_or_create(dir: impl AsRef<Path>, model: &str, dimension: usize) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.join(MANIFEST_FILE).is_file() {
            let store = Self::open(dir)?;
            if store.manifest.model != model || store.manifest.dimension != dimension {
                return Err(Error::Store(format!(
                    "collection at {} was built with {} ({} dims), not {model} ({dimension} dims)",
                    dir.display(),
                    store.manifest.model,
                    store.manifest.dimension
                )));
            }
            return Ok(store);
        }

        fs::create_dir_all(dir)?;
        // records left behind without a manifest are kept, never truncated
        let records_path = dir.join(RECORDS_FILE);
        let records = load_records(&records_path, dimension)?;
        OpenOptions::new().create(true).append(true).open(&records_path)?;

        let manifest = Manifest {
            model: model.to_string(),
            dimension,
        };
        let mut writer = BufWriter::new(File::create(dir.join(MANIFEST_FILE))?);
        serde_json::to_writer_pretty(&mut writer, &manifest)?;
        writer.flush()?;

        debug!(dir = %dir.display(), model, dimension, records = records.len(), "created collection");
        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            records,
        })
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }
}

fn load_records(path: &Path, dimension: usize) -> Result<Vec<EmbeddingRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (n, line) in BufReader::new(File::open(path)?).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: EmbeddingRecord = serde_json::from_str(&line)
            .map_err(|e| Error::Store(format!("{}:{}: {e}", path.display(), n + 1)))?;
        if record.embedding.len() != dimension {
            return Err(Error::Store(format!(
                "{}:{}: embedding has {} dims, collection has {dimension}",
                path.display(),
                n + 1,
                record.embedding.len()
            )));
        }
        records.push(record);
    }
    Ok(records)
}

impl VectorStore for DiskStore {
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        validate_batch(chunks, embeddings, Some(self.manifest.dimension))?;
        if chunks.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(RECORDS_FILE))?;
        let mut writer = BufWriter::new(file);

        let mut batch = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let record = EmbeddingRecord {
                chunk: chunk.clone(),
                embedding: embedding.clone(),
            };
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
            batch.push(record);
        }
        writer.flush()?;

        debug!(appended = batch.len(), dir = %self.dir.display(), "persisted records");
        self.records.extend(batch);
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.manifest.dimension {
            return Err(Error::Store(format!(
                "query dimension {} does not match collection dimension {}",
                query.len(),
                self.manifest.dimension
            )));
        }
        Ok(top_k(&self.records, query, k))
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
