//! Ollama provider speaking the OpenAI-compatible chat API

use async_trait::async_trait;

use super::openai_compat::{build_request, message_from_response, ChatResponse};
use crate::{
    error::{Error, Result},
    providers::ChatModel,
    types::{Message, ToolSchema},
};

/// Client for a local Ollama server.
///
/// Talks to the OpenAI-compatible endpoint Ollama exposes under `/v1`.
pub struct OllamaChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OllamaChatModel {
    /// Default base URL for a local Ollama install
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434/v1";

    /// Create a client for the default local server
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL, model)
    }

    /// Create a client for a specific server
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the response length
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn invoke(&self, messages: &[Message], tools: Option<&[ToolSchema]>) -> Result<Message> {
        let tools = tools.unwrap_or_default();
        let request = build_request(
            Some(&self.model),
            messages,
            tools,
            self.temperature,
            self.max_tokens,
        );
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat request"
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api("chat_error", text));
        }

        let completion: ChatResponse = response.json().await?;
        message_from_response(completion)
    }
}
