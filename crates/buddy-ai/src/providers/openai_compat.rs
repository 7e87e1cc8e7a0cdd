//! Wire format for OpenAI-compatible chat completion APIs.
//!
//! Both Ollama and Databricks model serving speak this dialect; only the
//! URL shape and auth differ between the two providers.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{Content, Message, ToolSchema},
};

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ChatFunction,
}

#[derive(Debug, Serialize)]
pub struct ChatFunction {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: ChatFunctionCall,
}

#[derive(Debug, Serialize)]
pub struct ChatFunctionCall {
    pub name: String,
    /// Arguments as a JSON-encoded string, per the wire format
    pub arguments: String,
}

/// Build a non-streaming completion request from a conversation.
///
/// `model` is omitted for endpoints that encode the model in the URL.
pub fn build_request(
    model: Option<&str>,
    messages: &[Message],
    tools: &[ToolSchema],
    temperature: Option<f32>,
    max_tokens: Option<u32>,
) -> ChatRequest {
    let wire_messages = messages.iter().map(convert_message).collect();

    let wire_tools = if tools.is_empty() {
        None
    } else {
        Some(
            tools
                .iter()
                .map(|t| ChatTool {
                    tool_type: "function".to_string(),
                    function: ChatFunction {
                        name: t.name.clone(),
                        description: Some(t.description.clone()),
                        parameters: Some(t.parameters.clone()),
                    },
                })
                .collect(),
        )
    };

    let has_tools = wire_tools.is_some();
    ChatRequest {
        model: model.map(str::to_string),
        messages: wire_messages,
        stream: false,
        max_tokens,
        temperature,
        tools: wire_tools,
        tool_choice: if has_tools {
            Some(serde_json::json!("auto"))
        } else {
            None
        },
    }
}

fn convert_message(msg: &Message) -> ChatMessage {
    match msg {
        Message::System { content } => ChatMessage {
            role: "system".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Message::User { content, .. } => ChatMessage {
            role: "user".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Message::Assistant { content, .. } => {
            let mut text_parts = Vec::new();
            let mut tool_calls = Vec::new();

            for c in content {
                match c {
                    Content::Text { text } => text_parts.push(text.clone()),
                    Content::ToolCall {
                        id,
                        name,
                        arguments,
                    } => {
                        tool_calls.push(ChatToolCall {
                            id: id.clone(),
                            call_type: "function".to_string(),
                            function: ChatFunctionCall {
                                name: name.clone(),
                                arguments: serde_json::to_string(arguments).unwrap_or_default(),
                            },
                        });
                    }
                }
            }

            ChatMessage {
                role: "assistant".to_string(),
                content: if text_parts.is_empty() {
                    None
                } else {
                    Some(text_parts.join(""))
                },
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(tool_calls)
                },
                tool_call_id: None,
            }
        }
        Message::Tool {
            tool_call_id,
            content,
            ..
        } => ChatMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.clone()),
        },
    }
}

// Response types

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseToolCall {
    pub id: String,
    pub function: ResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct ResponseFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// Convert a completion response into an assistant [`Message`]
pub fn message_from_response(response: ChatResponse) -> Result<Message> {
    if let Some(usage) = &response.usage {
        tracing::debug!(
            input = usage.prompt_tokens,
            output = usage.completion_tokens,
            "chat completion usage"
        );
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse("no choices in completion".to_string()))?;
    if let Some(reason) = &choice.finish_reason {
        tracing::debug!(finish_reason = %reason, "chat completion finished");
    }

    let mut content = Vec::new();

    if let Some(text) = choice.message.content {
        if !text.is_empty() {
            content.push(Content::Text { text });
        }
    }

    for call in choice.message.tool_calls.unwrap_or_default() {
        let arguments =
            serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::json!({}));
        content.push(Content::ToolCall {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    Ok(Message::assistant(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_without_tools() {
        let messages = vec![Message::system("be brief"), Message::user("hi")];
        let request = build_request(Some("llama3.1"), &messages, &[], Some(0.2), None);

        assert_eq!(request.model.as_deref(), Some("llama3.1"));
        assert!(!request.stream);
        assert!(request.tools.is_none());
        assert!(request.tool_choice.is_none());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_build_request_with_tools() {
        let tools = vec![ToolSchema::new(
            "get_preference",
            "Extract a shopping preference",
            serde_json::json!({"type": "object"}),
        )];
        let request = build_request(None, &[Message::user("laptop")], &tools, None, Some(512));

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("model").is_none());
        assert_eq!(value["tool_choice"], "auto");
        assert_eq!(value["max_tokens"], 512);
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "get_preference");
    }

    #[test]
    fn test_convert_assistant_with_tool_call() {
        let msg = Message::assistant(vec![Content::tool_call(
            "call_1",
            "get_preference",
            serde_json::json!({"product_category": "laptop"}),
        )]);
        let request = build_request(Some("m"), &[msg], &[], None, None);

        let value = serde_json::to_value(&request).unwrap();
        let wire = &value["messages"][0];
        assert_eq!(wire["role"], "assistant");
        assert!(wire.get("content").is_none());
        assert_eq!(wire["tool_calls"][0]["id"], "call_1");
        // Arguments travel as a JSON-encoded string
        let args: serde_json::Value =
            serde_json::from_str(wire["tool_calls"][0]["function"]["arguments"].as_str().unwrap())
                .unwrap();
        assert_eq!(args["product_category"], "laptop");
    }

    #[test]
    fn test_convert_tool_result() {
        let msg = Message::tool_result("call_1", "[]");
        let request = build_request(Some("m"), &[msg], &[], None, None);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "tool");
        assert_eq!(value["messages"][0]["tool_call_id"], "call_1");
        assert_eq!(value["messages"][0]["content"], "[]");
    }

    #[test]
    fn test_message_from_text_response() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3}
        }))
        .unwrap();

        let msg = message_from_response(response).unwrap();
        assert_eq!(msg.text(), "Hello there");
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn test_message_from_tool_call_response() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_7",
                        "type": "function",
                        "function": {
                            "name": "get_preference",
                            "arguments": "{\"product_category\": \"headphones\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let msg = message_from_response(response).unwrap();
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "get_preference");
        assert_eq!(calls[0].2["product_category"], "headphones");
    }

    #[test]
    fn test_message_from_empty_response() {
        let response: ChatResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            message_from_response(response),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_malformed_arguments_fall_back_to_empty_object() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_preference", "arguments": "not json"}
                    }]
                }
            }]
        }))
        .unwrap();

        let msg = message_from_response(response).unwrap();
        assert_eq!(msg.tool_calls()[0].2, &serde_json::json!({}));
    }
}
