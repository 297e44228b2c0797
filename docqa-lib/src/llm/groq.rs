use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{CompletionRequest, LlmProvider};
use crate::{Error, Result};

/// Groq's OpenAI-compatible API root.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Chat-completions client for Groq (or any OpenAI-compatible endpoint).
///
/// One attempt per call; timeouts are the HTTP client defaults.
pub struct GroqProvider {
    api_key: String,
    model: String,
    endpoint: String,
    client: Client,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(api_key, model, GROQ_BASE_URL)
    }

    /// Point the client at another OpenAI-compatible API root.
    pub fn with_base_url(api_key: String, model: String, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("missing LLM API key".to_string()));
        }
        if model.trim().is_empty() {
            return Err(Error::Config("missing LLM model name".to_string()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Llm(format!("failed to build HTTP client: {e}")))?;
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Ok(Self {
            api_key,
            model,
            endpoint,
            client,
        })
    }
}

impl LlmProvider for GroqProvider {
    fn complete(&self, request: &CompletionRequest) -> Result<Option<String>> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| Error::Config("invalid LLM API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
        };

        debug!(model = %self.model, prompt_chars = request.prompt.len(), "requesting completion");
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .map_err(|e| Error::Llm(format!("failed to call chat completions: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Llm(format!("provider returned {status}: {text}")));
        }
        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| Error::Llm(format!("failed to parse completion response: {e}")))?;
        Ok(parsed.into_text())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .find_map(|choice| choice.message.and_then(|m| m.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response and hand back the request body.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut request = vec![0; content_length];
            reader.read_exact(&mut request).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            String::from_utf8(request).unwrap()
        });
        (url, handle)
    }

    fn request(prompt: &str) -> CompletionRequest<'_> {
        CompletionRequest {
            prompt,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    #[test]
    fn test_parse_first_message() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "Blue."}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Blue."));
    }

    #[test]
    fn test_parse_missing_result() {
        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(empty.into_text(), None);

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(null.into_text(), None);

        let bare: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.into_text(), None);
    }

    #[test]
    fn test_rejects_blank_key() {
        assert!(matches!(
            GroqProvider::new(" ".to_string(), "m".to_string()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_complete_round_trip() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "The sky is blue."}}]}"#,
        );
        let provider = GroqProvider::with_base_url("key".to_string(), "test-model".to_string(), &url).unwrap();

        let answer = provider.complete(&request("What color is the sky?")).unwrap();
        assert_eq!(answer.as_deref(), Some("The sky is blue."));

        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent["model"], "test-model");
        assert_eq!(sent["temperature"], 0.0);
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "What color is the sky?");
        assert!(sent.get("max_tokens").is_none());
    }

    #[test]
    fn test_complete_error_status() {
        let (url, server) = serve_once("401 Unauthorized", r#"{"error": "bad key"}"#);
        let provider = GroqProvider::with_base_url("key".to_string(), "m".to_string(), &url).unwrap();

        let err = provider.complete(&request("hi")).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, Error::Llm(_)));
        assert!(err.to_string().contains("401"));
    }
}
