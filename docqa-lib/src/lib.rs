//! docqa - question answering over uploaded PDF documents
//!
//! # Architecture
//!
//! ```text
//! PDF -> Extractor -> Chunker -> Embedder -> DiskStore
//!                                               |
//! Question -> Embedder -> retrieve <------------+
//!                            |
//!                      context + question -> LLM -> Answer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docqa_lib::{
//!     answer::AnswerService, chunk::FixedSizeChunker, embed::embedder_for,
//!     llm::GroqProvider, pipeline::Ingestor, search::SearchEngine, store::DiskStore,
//! };
//!
//! // Index a document
//! let embedder = embedder_for("all-mpnet-base-v2")?;
//! let store = DiskStore::open_or_create("doc_vectorstore", embedder.model_name(), embedder.dimension())?;
//! let mut ingestor = Ingestor::new(FixedSizeChunker::new(2000, 200)?, SearchEngine::new(embedder, store));
//! ingestor.process_file("pdfs/doc.pdf".as_ref())?;
//!
//! // Ask
//! let embedder = embedder_for("all-mpnet-base-v2")?;
//! let engine = SearchEngine::new(embedder, DiskStore::open("doc_vectorstore")?);
//! let llm = GroqProvider::new(api_key, "deepseek-r1-distill-llama-70b".to_string())?;
//! let answer = AnswerService::new(engine, llm).answer("What color is the sky?")?;
//! ```

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod search;
pub mod store;

pub use error::{Error, Result};
