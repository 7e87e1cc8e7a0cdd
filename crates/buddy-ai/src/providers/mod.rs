//! Chat model providers

pub mod databricks;
pub mod ollama;

mod openai_compat;

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    types::{Message, ToolSchema},
};

/// Trait for chat model backends.
///
/// One call is one blocking request/response exchange. Providers do not
/// retry and do not stream; callers own the conversation history.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a conversation to the model and return its reply.
    ///
    /// When `tools` is bound the returned assistant message may carry tool
    /// calls; without tools the model is expected to answer in plain text.
    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Message>;
}

/// Get a credential from a provided value or an environment variable
pub fn credential(provided: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(value) = provided {
        return Ok(value.to_string());
    }

    std::env::var(env_var).map_err(|_| Error::MissingCredentials(env_var.to_string()))
}
