//! OpenAI Responses API client.
//!
//! Sends the exchange as `input` messages with function tools attached and
//! decodes the ordered `output` array. Unknown output item types are kept as
//! `OutputItem::Other` so callers can skip them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::costs;
use super::provider::{
    LlmProvider, OutputItem, ToolCompletionRequest, ToolCompletionResponse, ToolDefinition,
};
use crate::error::LlmError;

const PROVIDER: &str = "openai";

/// `LlmProvider` backed by `POST {base_url}/responses`.
pub struct OpenAiResponsesProvider {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiResponsesProvider {
    pub fn new(
        client: reqwest::Client,
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    text: TextConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<FunctionTool<'a>>,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct TextConfig {
    format: FormatSpec,
}

#[derive(Serialize)]
struct FormatSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct FunctionTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
    strict: bool,
}

impl<'a> From<&'a ToolDefinition> for FunctionTool<'a> {
    fn from(def: &'a ToolDefinition) -> Self {
        Self {
            kind: "function",
            name: &def.name,
            description: &def.description,
            parameters: &def.parameters,
            strict: def.strict,
        }
    }
}

#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output: Vec<Value>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Decode one `output` entry. Never fails: shapes we can't use become `Other`.
fn decode_output_item(item: &Value) -> OutputItem {
    let kind = item.get("type").and_then(Value::as_str).unwrap_or("unknown");
    match kind {
        "function_call" => {
            let Some(name) = item.get("name").and_then(Value::as_str) else {
                return OutputItem::Other {
                    kind: kind.to_string(),
                };
            };
            OutputItem::FunctionCall {
                call_id: str_field(item, "call_id"),
                name: name.to_string(),
                arguments: str_field(item, "arguments"),
            }
        }
        "message" => {
            let parts: Vec<&str> = item
                .get("content")
                .and_then(Value::as_array)
                .map(|content| {
                    content
                        .iter()
                        .filter(|p| p.get("type").and_then(Value::as_str) == Some("output_text"))
                        .filter_map(|p| p.get("text").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default();
            let text = if parts.is_empty() {
                None
            } else {
                Some(parts.concat())
            };
            OutputItem::Message { text }
        }
        other => OutputItem::Other {
            kind: other.to_string(),
        },
    }
}

fn str_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl LlmProvider for OpenAiResponsesProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        costs::model_cost(&self.model).unwrap_or((Decimal::ZERO, Decimal::ZERO))
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse, LlmError> {
        let body = ResponsesRequest {
            model: &self.model,
            input: request
                .messages
                .iter()
                .map(|m| InputMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            text: TextConfig {
                format: FormatSpec {
                    kind: request.output_format.as_str(),
                },
            },
            tools: request.tools.iter().map(FunctionTool::from).collect(),
        };

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending responses request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => LlmError::AuthFailed {
                    provider: PROVIDER.to_string(),
                },
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                    provider: PROVIDER.to_string(),
                    retry_after: retry_after(response.headers()),
                },
                _ => {
                    let text = response.text().await.unwrap_or_default();
                    let preview: String = text.chars().take(300).collect();
                    LlmError::RequestFailed {
                        provider: PROVIDER.to_string(),
                        reason: format!("HTTP {status}: {preview}"),
                    }
                }
            });
        }

        let parsed: ResponsesBody =
            response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                })?;

        let usage = parsed.usage.unwrap_or_default();
        Ok(ToolCompletionResponse {
            output: parsed.output.iter().map(decode_output_item).collect(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            response_id: parsed.id,
        })
    }
}
