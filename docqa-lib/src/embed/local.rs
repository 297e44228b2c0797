use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::debug;

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Sentence embedding models available through fastembed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalModel {
    /// sentence-transformers/all-mpnet-base-v2, 768 dimensions
    AllMpnetBaseV2,
    /// sentence-transformers/all-MiniLM-L6-v2, 384 dimensions
    AllMiniLmL6V2,
    /// BAAI/bge-small-en-v1.5, 384 dimensions
    BgeSmallEnV15,
    /// BAAI/bge-large-en-v1.5, 1024 dimensions
    BgeLargeEnV15,
}

impl LocalModel {
    /// Look up a model by its short or full name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        let short = name.rsplit('/').next().unwrap_or(&name);
        match short {
            "all-mpnet-base-v2" => Some(Self::AllMpnetBaseV2),
            "all-minilm-l6-v2" => Some(Self::AllMiniLmL6V2),
            "bge-small-en-v1.5" => Some(Self::BgeSmallEnV15),
            "bge-large-en-v1.5" => Some(Self::BgeLargeEnV15),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AllMpnetBaseV2 => "sentence-transformers/all-mpnet-base-v2",
            Self::AllMiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            Self::BgeSmallEnV15 => "BAAI/bge-small-en-v1.5",
            Self::BgeLargeEnV15 => "BAAI/bge-large-en-v1.5",
        }
    }

    #[must_use]
    pub fn dimension(self) -> usize {
        match self {
            Self::AllMpnetBaseV2 => 768,
            Self::AllMiniLmL6V2 | Self::BgeSmallEnV15 => 384,
            Self::BgeLargeEnV15 => 1024,
        }
    }

    fn is_bge(self) -> bool {
        matches!(self, Self::BgeSmallEnV15 | Self::BgeLargeEnV15)
    }

    fn fastembed_model(self) -> EmbeddingModel {
        match self {
            Self::AllMpnetBaseV2 => EmbeddingModel::AllMpnetBaseV2,
            Self::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            Self::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
            Self::BgeLargeEnV15 => EmbeddingModel::BGELargeENV15,
        }
    }
}

/// Local embedder running an ONNX sentence model via fastembed.
///
/// The model is downloaded on first use and cached by fastembed.
pub struct LocalEmbedder {
    model: TextEmbedding,
    kind: LocalModel,
}

impl LocalEmbedder {
    /// Load the given model, downloading it if needed.
    pub fn new(kind: LocalModel) -> Result<Self> {
        debug!(model = kind.name(), "loading embedding model");
        let opts = InitOptions::new(kind.fastembed_model()).with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self { model, kind })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        self.kind.name()
    }

    fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .embed(texts, None)
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        // BGE uses a special prompt prefix for queries to improve retrieval
        let query_text = if self.kind.is_bge() {
            format!("Represent this sentence for searching relevant passages: {text}")
        } else {
            text.to_string()
        };

        self.model
            .embed(vec![query_text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}
