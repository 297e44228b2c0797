//! Question answering over the indexed collection
//!
//! Each question is answered independently: retrieve the best chunks,
//! "stuff" them into one prompt, ask the model. No conversation state is
//! kept between calls.

use tracing::{debug, info};

use crate::embed::Embedder;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::search::SearchEngine;
use crate::store::{SearchResult, VectorStore};
use crate::{Error, Result};

/// Returned when the provider produced no text.
pub const NO_RESPONSE: &str = "no response generated";

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

/// Answers questions from retrieved context.
pub struct AnswerService<E: Embedder, S: VectorStore, L: LlmProvider> {
    engine: SearchEngine<E, S>,
    llm: L,
    top_k: usize,
    temperature: f32,
}

impl<E: Embedder, S: VectorStore, L: LlmProvider> AnswerService<E, S, L> {
    /// Create a service retrieving [`DEFAULT_TOP_K`] chunks at temperature 0.
    #[must_use]
    pub fn new(engine: SearchEngine<E, S>, llm: L) -> Self {
        Self {
            engine,
            llm,
            top_k: DEFAULT_TOP_K,
            temperature: 0.0,
        }
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Answer `question` from the indexed documents.
    ///
    /// Returns the model's raw text, or [`NO_RESPONSE`] if it gave none.
    /// Retrieval and provider failures are wrapped in [`Error::Answer`].
    pub fn answer(&mut self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("please enter a question".to_string()));
        }
        self.generate(question).map_err(|e| Error::Answer(Box::new(e)))
    }

    fn generate(&mut self, question: &str) -> Result<String> {
        let results = self.engine.retrieve(question, self.top_k)?;
        let context = render_context(&results);
        let prompt = build_prompt(&context, question);

        info!(chunks = results.len(), model = self.llm.model(), "generating answer");
        let request = CompletionRequest {
            prompt: &prompt,
            temperature: self.temperature,
            max_tokens: None,
        };
        let answer = self.llm.complete(&request)?;
        debug!(empty = answer.is_none(), "completion received");

        Ok(answer.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }
}

/// Concatenate chunk texts, best match first, separated by blank lines.
#[must_use]
pub fn render_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the single "stuff" prompt sent to the model.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\n\
         Question: {question}\n\
         Helpful Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkMetadata, Chunker, FixedSizeChunker};
    use crate::embed::HashingEmbedder;
    use crate::store::MemoryStore;
    use std::cell::RefCell;

    /// Records every prompt and answers with a fixed reply.
    struct StubLlm {
        reply: Option<String>,
        fail: bool,
        prompts: RefCell<Vec<String>>,
    }

    impl StubLlm {
        fn replying(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                fail: false,
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::replying(None)
            }
        }
    }

    impl LlmProvider for StubLlm {
        fn complete(&self, request: &CompletionRequest) -> Result<Option<String>> {
            assert_eq!(request.temperature, 0.0);
            self.prompts.borrow_mut().push(request.prompt.to_string());
            if self.fail {
                return Err(Error::Llm("provider returned 503".to_string()));
            }
            Ok(self.reply.clone())
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    fn indexed_engine() -> SearchEngine<HashingEmbedder, MemoryStore> {
        let mut engine = SearchEngine::new(HashingEmbedder::new(), MemoryStore::new());
        let chunks = FixedSizeChunker::new(60, 10).unwrap().chunk(
            "The sky is blue. Grass is green in spring. Bread is baked in ovens \
             across the world. Mountains are tall and cold at the top.",
            ChunkMetadata::for_source("facts.pdf"),
        );
        engine.add(&chunks).unwrap();
        engine
    }

    #[test]
    fn test_answer_passes_context_and_question() {
        let mut service = AnswerService::new(indexed_engine(), StubLlm::replying(Some("Blue.")));

        let answer = service.answer("What color is the sky?").unwrap();
        assert_eq!(answer, "Blue.");

        let prompts = service.llm.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("The sky is blue."));
        assert!(prompts[0].ends_with("Question: What color is the sky?\nHelpful Answer:"));
    }

    #[test]
    fn test_missing_result_uses_sentinel() {
        let mut service = AnswerService::new(indexed_engine(), StubLlm::replying(None));
        assert_eq!(service.answer("What color is the sky?").unwrap(), NO_RESPONSE);
    }

    #[test]
    fn test_provider_failure_is_wrapped() {
        let mut service = AnswerService::new(indexed_engine(), StubLlm::failing());

        let err = service.answer("What color is the sky?").unwrap_err();
        assert!(matches!(err, Error::Answer(ref inner) if matches!(**inner, Error::Llm(_))));
        assert!(err.to_string().starts_with("error generating response"));
    }

    #[test]
    fn test_empty_index_is_wrapped_not_found() {
        let engine = SearchEngine::new(HashingEmbedder::new(), MemoryStore::new());
        let mut service = AnswerService::new(engine, StubLlm::replying(Some("unused")));

        let err = service.answer("anything?").unwrap_err();
        assert!(err.is_not_found());
        assert!(service.llm.prompts.borrow().is_empty());
    }

    #[test]
    fn test_blank_question_rejected() {
        let mut service = AnswerService::new(indexed_engine(), StubLlm::replying(Some("x")));
        assert!(matches!(service.answer("   "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_top_k_limits_context() {
        let mut service = AnswerService::new(indexed_engine(), StubLlm::replying(Some("x"))).with_top_k(1);
        service.answer("What color is the sky?").unwrap();

        let prompt = service.llm.prompts.borrow()[0].clone();
        assert!(!prompt.contains("\n\n\n"));
        assert_eq!(prompt.matches("\n\n").count(), 2);
    }

    #[test]
    fn test_render_context_joins_with_blank_lines() {
        use crate::chunk::Chunk;
        let result = |content: &str| SearchResult {
            chunk: Chunk {
                id: content.to_string(),
                content: content.to_string(),
                metadata: ChunkMetadata::default(),
            },
            score: 1.0,
        };
        assert_eq!(render_context(&[result("a"), result("b")]), "a\n\nb");
    }
}
