use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::store::{top_k, validate_batch, EmbeddingRecord, SearchResult, VectorStore};
use crate::{Error, Result};

/// In-memory vector store.
///
/// Uses brute-force cosine similarity search and keeps nothing on disk.
/// Suitable for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<EmbeddingRecord>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.len())
    }
}

impl VectorStore for MemoryStore {
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        validate_batch(chunks, embeddings, self.dimension())?;
        self.records
            .extend(chunks.iter().zip(embeddings).map(|(chunk, embedding)| EmbeddingRecord {
                chunk: chunk.clone(),
                embedding: embedding.clone(),
            }));
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>> {
        if let Some(dimension) = self.dimension() {
            if query.len() != dimension {
                return Err(Error::Store(format!(
                    "query dimension {} does not match store dimension {dimension}",
                    query.len()
                )));
            }
        }
        Ok(top_k(&self.records, query, k))
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
