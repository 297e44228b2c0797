//! Document chunking
//!
//! Extracted text is split into overlapping, bounded-length segments
//! before embedding. Overlap keeps sentences that straddle a boundary
//! retrievable from either side.
//!
//! # Implementing a Chunker
//!
//! ```ignore
//! use docqa_lib::chunk::{Chunker, Chunk, ChunkMetadata};
//!
//! struct MyChunker { /* ... */ }
//!
//! impl Chunker for MyChunker {
//!     fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk> {
//!         // Your chunking logic here
//!         todo!()
//!     }
//! }
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A chunk of text with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Identifier derived from source, position and content
    pub id: String,
    /// The text content of this chunk
    pub content: String,
    /// Metadata about the source and position
    pub metadata: ChunkMetadata,
}

/// Metadata associated with a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct ChunkMetadata {
    /// Source document name
    pub source_id: Option<String>,
    /// Character offset of the chunk within the source text
    pub position: usize,
    /// Total number of chunks from this source
    pub total_chunks: Option<usize>,
}

impl ChunkMetadata {
    /// Metadata for chunks of the named document.
    #[must_use]
    pub fn for_source(name: impl Into<String>) -> Self {
        Self {
            source_id: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split content into chunks
    ///
    /// # Arguments
    /// * `content` - The text content to chunk
    /// * `metadata` - Base metadata to attach to each chunk
    ///
    /// # Returns
    /// Chunks in document order, each with position metadata
    fn chunk(&self, content: &str, metadata: ChunkMetadata) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

pub(crate) fn generate_id(source: Option<&str>, position: usize, content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    position.hash(&mut hasher);
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

mod fixed;

pub use fixed::*;
