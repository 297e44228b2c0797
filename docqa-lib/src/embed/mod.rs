//! Text embedding
//!
//! Embedding is an injected capability: the pipeline only sees the
//! [`Embedder`] trait, so the local ONNX models can be swapped for the
//! deterministic [`HashingEmbedder`] offline or in tests.
//!
//! # Usage
//!
//! ```ignore
//! use docqa_lib::embed::{embedder_for, Embedder};
//!
//! let mut embedder = embedder_for("all-mpnet-base-v2")?;
//!
//! // Embed documents (for indexing)
//! let doc_embeddings = embedder.embed_documents(&["The sky is blue."])?;
//!
//! // Embed query (for searching)
//! let query_embedding = embedder.embed_query("What color is the sky?")?;
//! ```

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Note: Some models (like BGE) use different prompts for queries vs documents.
    /// This method handles that distinction.
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

// lets one loaded model serve several engines in turn
impl<T: Embedder + ?Sized> Embedder for &mut T {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Build the embedder configured by `name`.
///
/// `"hashing"` selects [`HashingEmbedder`]; anything else must name a
/// model known to [`LocalModel::from_name`].
pub fn embedder_for(name: &str) -> Result<Box<dyn Embedder>> {
    if name.eq_ignore_ascii_case(HashingEmbedder::NAME) {
        return Ok(Box::new(HashingEmbedder::new()));
    }
    let model = LocalModel::from_name(name)
        .ok_or_else(|| Error::Config(format!("unknown embedding model '{name}'")))?;
    Ok(Box::new(LocalEmbedder::new(model)?))
}

mod hashing;
mod local;

pub use hashing::*;
pub use local::*;
