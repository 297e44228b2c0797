//! Completion providers
//!
//! The answering service only depends on [`LlmProvider`], so the hosted
//! model can be replaced by a stub in tests.

use crate::Result;

/// Request envelope shared by the various providers.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

/// Trait implemented by concrete LLM providers.
pub trait LlmProvider {
    /// Request a single completion for `request`.
    ///
    /// Returns `Ok(None)` when the provider answered without any text.
    fn complete(&self, request: &CompletionRequest) -> Result<Option<String>>;

    /// Model identifier sent to the provider.
    fn model(&self) -> &str;
}

impl<T: LlmProvider + ?Sized> LlmProvider for Box<T> {
    fn complete(&self, request: &CompletionRequest) -> Result<Option<String>> {
        (**self).complete(request)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

mod groq;

pub use groq::*;
