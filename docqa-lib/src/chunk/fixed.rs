use crate::chunk::{generate_id, Chunk, ChunkMetadata, Chunker};
use crate::{Error, Result};

/// Fixed-size chunker - splits by character count with overlap
///
/// Sizes are counted in characters (Unicode scalar values), so a chunk
/// never splits a multi-byte character.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a chunker producing chunks of at most `chunk_size` characters,
    /// each sharing `overlap` characters with its predecessor.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Chunking("chunk size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Chunking(format!(
                "overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            overlap: 200,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn chunk(&self, content: &str, mut metadata: ChunkMetadata) -> Vec<Chunk> {
        // byte offset of every char, plus the end of the string
        let bounds: Vec<usize> = content
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(content.len()))
            .collect();
        let total_chars = bounds.len() - 1;
        if total_chars == 0 {
            return Vec::new();
        }

        let stride = self.chunk_size - self.overlap;
        let total = if total_chars <= self.chunk_size {
            1
        } else {
            (total_chars - self.overlap).div_ceil(stride)
        };
        metadata.total_chunks = Some(total);

        let mut chunks = Vec::with_capacity(total);
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(total_chars);
            let c = &content[bounds[start]..bounds[end]];

            let mut m = metadata.clone();
            m.position = start;

            chunks.push(Chunk {
                id: generate_id(m.source_id.as_deref(), start, c),
                content: c.to_string(),
                metadata: m,
            });

            // stop once the tail is covered so no chunk is swallowed by its predecessor
            if end == total_chars {
                break;
            }
            start += stride;
        }
        chunks
    }
}
