//! High-level index/retrieve interface
//!
//! Combines an embedder and a store into the two collection operations
//! the pipeline needs: `add` chunks and `retrieve` the best matches for a
//! query.
//!
//! # Usage
//!
//! ```ignore
//! use docqa_lib::search::SearchEngine;
//!
//! let store = DiskStore::open_or_create("doc_vectorstore", embedder.model_name(), embedder.dimension())?;
//! let mut engine = SearchEngine::new(embedder, store);
//! engine.add(&chunks)?;
//! let results = engine.retrieve("What color is the sky?", 4)?;
//! ```

use std::path::Path;

use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::Embedder;
use crate::store::{DiskStore, SearchResult, VectorStore};
use crate::{Error, Result};

/// Search engine combining an embedding function with a vector store.
pub struct SearchEngine<E: Embedder, S: VectorStore> {
    embedder: E,
    store: S,
}

impl<E: Embedder, S: VectorStore> SearchEngine<E, S> {
    /// Create a new search engine.
    #[must_use]
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    /// Embed chunks and append them to the store.
    ///
    /// Returns the number of records added.
    pub fn add(&mut self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "model returned {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        self.store.insert(chunks, &embeddings)?;

        debug!(added = chunks.len(), total = self.store.len(), "indexed chunks");
        Ok(chunks.len())
    }

    /// Return the `k` chunks most similar to `query`, best first.
    ///
    /// An empty store is reported as [`Error::NotFound`], never as an
    /// empty result.
    pub fn retrieve(&mut self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be at least 1".to_string()));
        }
        if self.store.is_empty() {
            return Err(Error::NotFound(
                "vector store is empty; please process a document first".to_string(),
            ));
        }

        let query_embedding = self.embedder.embed_query(query)?;
        let results = self.store.search(&query_embedding, k)?;
        debug!(k, returned = results.len(), "retrieved chunks");
        Ok(results)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// Embed `chunks` with `embedder` and append them to the collection at
/// `persist_location`, creating it if absent.
pub fn add<E: Embedder>(chunks: &[Chunk], embedder: E, persist_location: &Path) -> Result<usize> {
    let store = DiskStore::open_or_create(persist_location, embedder.model_name(), embedder.dimension())?;
    SearchEngine::new(embedder, store).add(chunks)
}

/// Load the collection at `persist_location` and return the `k` records
/// closest to `query`.
///
/// Fails with [`Error::NotFound`] if nothing has been persisted there.
pub fn retrieve<E: Embedder>(
    query: &str,
    persist_location: &Path,
    embedder: E,
    k: usize,
) -> Result<Vec<SearchResult>> {
    let store = DiskStore::open(persist_location)?;
    SearchEngine::new(embedder, store).retrieve(query, k)
}
