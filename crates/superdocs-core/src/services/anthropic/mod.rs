use anyhow::Result;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{env, fmt::Debug};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// `ANTHROPIC_API_KEY` is required; `SUPERDOCS_MODEL` overrides the model.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow::anyhow!("ANTHROPIC_API_KEY environment variable not set"))?;
        let mut config = Self::new(api_key);
        if let Ok(model) = env::var("SUPERDOCS_MODEL") {
            config.model = model;
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(rename = "type")]
    response_type: String,
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(rename = "type")]
    delta_type: String,
    #[serde(default)]
    text: String,
}

/// Receives each streamed text delta as it arrives.
pub type ChunkCallback = Box<dyn FnMut(String) + Send + 'static>;

// reqwest futures are not Send in the browser.
#[cfg_attr(test, mockall::automock)]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CompletionClient: Send + Sync + Debug {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Streams a completion, calling `on_chunk` per delta, and returns the
    /// full text.
    async fn stream_completion(
        &self,
        system: &str,
        user: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    config: ModelConfig,
}

impl AnthropicClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ModelConfig::from_env()?))
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    async fn send(&self, system: &str, user: &str, stream: bool) -> Result<reqwest::Response> {
        let request_body = ClaudeRequest {
            model: &self.config.model,
            system,
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            stream,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let error_text = response.text().await?;
            tracing::error!("API request failed: {}", error_text);
            anyhow::bail!("API request failed: {}", error_text);
        }
        Ok(response)
    }
}

/// Text carried by one SSE line, if it is a `text_delta` event.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }
    let event: StreamResponse = serde_json::from_str(data).ok()?;
    if event.response_type != "content_block_delta" {
        return None;
    }
    let delta = event.delta?;
    (delta.delta_type == "text_delta").then_some(delta.text)
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let response = self.send(system, user, false).await?;
        let claude_response: ClaudeResponse = response.json().await?;
        let text: String = claude_response.content.into_iter().map(|c| c.text).collect();
        Ok(text)
    }

    async fn stream_completion(
        &self,
        system: &str,
        user: &str,
        mut on_chunk: ChunkCallback,
    ) -> Result<String> {
        let response = self.send(system, user, true).await?;
        let mut stream = response.bytes_stream();
        let mut assistant_message = String::new();
        // Events can be split across network chunks.
        let mut pending = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            pending.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = pending.find('\n') {
                let line: String = pending.drain(..=newline).collect();
                if let Some(text) = parse_sse_line(line.trim_end()) {
                    assistant_message.push_str(&text);
                    on_chunk(text);
                }
            }
        }
        if let Some(text) = parse_sse_line(pending.trim_end()) {
            assistant_message.push_str(&text);
            on_chunk(text);
        }

        tracing::debug!("streamed {} bytes from {}", assistant_message.len(), self.config.model);
        Ok(assistant_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_sse_line() {
        let test_cases = vec![
            (
                r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hel"}}"#,
                Some("Hel"),
            ),
            (
                r#"data:{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"lo"}}"#,
                Some("lo"),
            ),
            (
                r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"{"}}"#,
                None,
            ),
            (r#"data: {"type":"message_stop"}"#, None),
            ("event: content_block_delta", None),
            ("data: [DONE]", None),
            ("", None),
        ];

        for (line, expected) in test_cases {
            assert_eq!(parse_sse_line(line).as_deref(), expected, "Failed for line: {}", line);
        }
    }

    #[test]
    fn test_model_config_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_mock_client() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .returning(|_, user| Ok(format!("echo: {}", user)));

        assert_eq!(mock.complete("sys", "hi").await.unwrap(), "echo: hi");
    }
}
