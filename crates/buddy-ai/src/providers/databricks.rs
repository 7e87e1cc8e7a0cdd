//! Databricks model serving provider

use async_trait::async_trait;

use super::openai_compat::{build_request, message_from_response, ChatResponse};
use crate::{
    error::{Error, Result},
    providers::{credential, ChatModel},
    types::{Message, ToolSchema},
};

/// Client for a Databricks model serving endpoint.
///
/// The endpoint name identifies the model, so requests carry no `model`
/// field. Authentication is a workspace personal access token.
pub struct DatabricksChatModel {
    client: reqwest::Client,
    host: String,
    token: String,
    endpoint: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl DatabricksChatModel {
    /// Create a client for a serving endpoint
    pub fn new(
        host: impl Into<String>,
        token: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            token: token.into(),
            endpoint: endpoint.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create from `DATABRICKS_HOST` and `DATABRICKS_TOKEN`
    pub fn from_env(endpoint: impl Into<String>) -> Result<Self> {
        let host = credential(None, "DATABRICKS_HOST")?;
        let token = credential(None, "DATABRICKS_TOKEN")?;
        Ok(Self::new(host, token, endpoint))
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
impl ChatModel for DatabricksChatModel {
    async fn invoke(&self, messages: &[Message], tools: Option<&[ToolSchema]>) -> Result<Message> {
        let tools = tools.unwrap_or_default();
        let request = build_request(None, messages, tools, self.temperature, self.max_tokens);
        let url = format!(
            "{}/serving-endpoints/{}/invocations",
            self.host.trim_end_matches('/'),
            self.endpoint
        );

        tracing::debug!(
            endpoint = %self.endpoint,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api("chat_error", text));
        }

        let completion: ChatResponse = response.json().await?;
        message_from_response(completion)
    }
}
