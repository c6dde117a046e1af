//! Provider-agnostic request/response types and the `LlmProvider` trait.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// A single message in the exchange sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Function-calling tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the arguments object.
    pub parameters: serde_json::Value,
    /// Ask the provider to enforce the schema exactly.
    #[serde(default)]
    pub strict: bool,
}

/// Requested format for free-text output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
        }
    }
}

/// A completion request that allows tool calls.
#[derive(Debug, Clone)]
pub struct ToolCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub output_format: OutputFormat,
}

impl ToolCompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            messages,
            tools,
            output_format: OutputFormat::Text,
        }
    }
}

/// One item of a provider's ordered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    /// The model asked for a tool. `arguments` is still JSON-encoded.
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    /// Free text. `None` when the item carried no readable text.
    Message { text: Option<String> },
    /// Any item shape we don't understand (reasoning traces, etc.).
    Other { kind: String },
}

/// Raw response from a tool-enabled completion.
#[derive(Debug, Clone, Default)]
pub struct ToolCompletionResponse {
    pub output: Vec<OutputItem>,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub response_id: Option<String>,
}

/// An inference backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// (input, output) cost per token in USD.
    fn cost_per_token(&self) -> (Decimal, Decimal);

    /// Send messages plus a tool catalog; return the ordered output items.
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse, LlmError>;
}
