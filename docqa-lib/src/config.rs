//! Configuration file handling.
//!
//! The configuration is a single JSON object. Only the LLM API key is
//! required; everything else falls back to the defaults below.
//!
//! ```json
//! {
//!   "GROQ_API_KEY": "gsk_...",
//!   "model": "deepseek-r1-distill-llama-70b",
//!   "top_k": 4
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key for the completion provider
    #[serde(rename = "GROQ_API_KEY", default)]
    pub api_key: Option<String>,

    /// Chat model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (0 = deterministic decoding)
    #[serde(default)]
    pub temperature: f32,

    /// Embedding model name, see [`crate::embed::embedder_for`]
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Directory uploaded PDFs are copied into
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory holding the persisted collection
    #[serde(default = "default_vectorstore_dir")]
    pub vectorstore_dir: PathBuf,

    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_model() -> String {
    "deepseek-r1-distill-llama-70b".to_string()
}

fn default_embedding_model() -> String {
    "all-mpnet-base-v2".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("pdfs")
}

fn default_vectorstore_dir() -> PathBuf {
    PathBuf::from("doc_vectorstore")
}

fn default_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: 0.0,
            embedding_model: default_embedding_model(),
            upload_dir: default_upload_dir(),
            vectorstore_dir: default_vectorstore_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

impl Config {
    /// Load and validate the configuration at `path`.
    ///
    /// Fails if the file is missing, is not valid JSON, or lacks a
    /// non-empty `GROQ_API_KEY`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "{} not found in the working directory",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))?;
        config.validate()?;

        debug!(path = %path.display(), model = %config.model, "loaded configuration");
        Ok(config)
    }

    /// The API key, which [`Config::load`] guarantees is present.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("GROQ_API_KEY is missing in config".to_string()))
    }

    fn validate(&self) -> Result<()> {
        self.api_key()?;
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load(dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_key() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), r#"{"model": "llama"}"#);
        let err = Config::load(path).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_blank_key() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), r#"{"GROQ_API_KEY": "   "}"#);
        assert!(Config::load(path).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), r#"{"GROQ_API_KEY": "secret"}"#);
        let config = Config::load(path).unwrap();

        assert_eq!(config.api_key().unwrap(), "secret");
        assert_eq!(config.model, "deepseek-r1-distill-llama-70b");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.chunk_size, 2000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.embedding_model, "all-mpnet-base-v2");
        assert!(crate::embed::LocalModel::from_name(&config.embedding_model).is_some());
        assert_eq!(config.vectorstore_dir, PathBuf::from("doc_vectorstore"));
    }

    #[test]
    fn test_overrides() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            r#"{"GROQ_API_KEY": "k", "top_k": 2, "embedding_model": "hashing"}"#,
        );
        let config = Config::load(path).unwrap();
        assert_eq!(config.top_k, 2);
        assert_eq!(config.embedding_model, "hashing");
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "{ not json");
        assert!(matches!(Config::load(path), Err(Error::Config(_))));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            r#"{"GROQ_API_KEY": "k", "chunk_size": 100, "chunk_overlap": 100}"#,
        );
        assert!(matches!(Config::load(path), Err(Error::Config(_))));
    }
}
