//! Vector storage backends
//!
//! [`DiskStore`] persists a collection to a directory so it survives
//! between runs; [`MemoryStore`] keeps everything in process.
//!
//! # Storage Model
//!
//! Each stored item is an [`EmbeddingRecord`]:
//! - Chunk: the original text and metadata
//! - Embedding: the vector representation
//!
//! Collections are append-only. There is no update or delete path, so
//! inserting the same chunk twice stores it twice.
//!
//! # Usage
//!
//! ```ignore
//! use docqa_lib::store::{VectorStore, DiskStore};
//!
//! let mut store = DiskStore::open_or_create("doc_vectorstore", "hashing", 256)?;
//!
//! // Append chunks with their embeddings
//! store.insert(&chunks, &embeddings)?;
//!
//! // Search by vector similarity
//! let results = store.search(&query_embedding, 4)?;
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::embed::Embedding;
use crate::{Error, Result};

/// A chunk together with its embedding, as persisted in a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

/// A search result with similarity score
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity to the query, -1.0 to 1.0 (higher is more similar)
    pub score: f32,
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

/// Trait for vector storage backends
pub trait VectorStore: Send + Sync {
    /// Append chunks with their embeddings
    ///
    /// # Arguments
    /// * `chunks` - The text chunks to store
    /// * `embeddings` - Corresponding embeddings (must be same length)
    fn insert(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()>;

    /// Search for similar chunks
    ///
    /// # Arguments
    /// * `query_embedding` - The query vector
    /// * `k` - Number of results to return
    ///
    /// # Returns
    /// Top-k results sorted by similarity (highest first)
    fn search(&self, query_embedding: &Embedding, k: usize) -> Result<Vec<SearchResult>>;

    /// Get total number of stored chunks
    fn len(&self) -> usize;

    /// Check if store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check an insert batch: one embedding per chunk, all of `dimension` (if known).
fn validate_batch(chunks: &[Chunk], embeddings: &[Embedding], dimension: Option<usize>) -> Result<()> {
    if chunks.len() != embeddings.len() {
        return Err(Error::InvalidInput(format!(
            "{} chunks but {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }
    let expected = dimension.or_else(|| embeddings.first().map(Vec::len));
    if let Some(expected) = expected {
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(Error::Store(format!(
                "embedding dimension {} does not match collection dimension {expected}",
                bad.len()
            )));
        }
    }
    Ok(())
}

/// Brute-force top-k by cosine similarity over `records`.
fn top_k<'a>(
    records: impl IntoIterator<Item = &'a EmbeddingRecord>,
    query: &[f32],
    k: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = records
        .into_iter()
        .map(|record| SearchResult {
            chunk: record.chunk.clone(),
            score: cosine_similarity(query, &record.embedding),
        })
        .collect();

    // stable sort keeps insertion order among equal scores
    results.sort_by(|a, b| b.cmp(a));
    results.truncate(k);
    results
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

mod disk;
mod memory;

pub use disk::*;
pub use memory::*;
