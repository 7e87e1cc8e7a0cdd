//! buddy-ai: Chat model abstraction for the shopping assistant
//!
//! This crate defines the conversation message model shared across the
//! workspace and the [`ChatModel`] trait implemented by the Ollama and
//! Databricks providers.

pub mod error;
pub mod providers;
pub mod types;

pub use error::{Error, Result};
pub use providers::databricks::DatabricksChatModel;
pub use providers::ollama::OllamaChatModel;
pub use providers::{credential, ChatModel};
pub use types::*;
