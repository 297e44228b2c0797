//! Error types for docqa

use thiserror::Error;

/// Result type alias for docqa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docqa operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to read or parse a document
    #[error("error extracting text from PDF: {0}")]
    Extraction(String),

    /// Document parsed but contained no text
    #[error("no text extracted from '{0}'; the file might be empty or scanned without OCR")]
    NoText(String),

    /// Failed to chunk a document
    #[error("chunking error: {0}")]
    Chunking(String),

    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Failed to store or retrieve from vector store
    #[error("store error: {0}")]
    Store(String),

    /// Collection or document not found
    #[error("not found: {0}")]
    NotFound(String),

    /// The completion provider failed
    #[error("llm error: {0}")]
    Llm(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Processing a single document failed
    #[error("error processing '{file}': {source}")]
    Processing {
        file: String,
        #[source]
        source: Box<Error>,
    },

    /// Answering a question failed
    #[error("error generating response: {0}")]
    Answer(#[source] Box<Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this error (or the error it wraps) is a missing collection.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Answer(inner) | Error::Processing { source: inner, .. } => inner.is_not_found(),
            _ => false,
        }
    }
}
