//! Normalized decision result: the provider-agnostic view of one inference call.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::llm::OutputItem;
use crate::tools::{DRAFT_RESPONSE, EmailAction};

/// A tool call with its arguments decoded from JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    /// Decoded arguments. `Value::Null` when the provider sent invalid JSON.
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Validate into a typed action.
    pub fn action(&self) -> Result<EmailAction, ToolError> {
        EmailAction::parse(&self.name, &self.arguments)
    }
}

/// Ordered tool invocations plus any free text from one inference call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionResult {
    pub tool_calls: Vec<ToolInvocation>,
    /// Free text, empty when the model sent none.
    pub text: String,
}

impl DecisionResult {
    /// Normalize raw provider output.
    ///
    /// Tool calls keep provider order. Argument strings that fail to decode
    /// are kept as `Null` so they are rejected later, at the point of use.
    /// If several text items arrive the last one wins; unreadable text is
    /// treated as empty. Other item kinds are skipped.
    pub fn from_output(output: &[OutputItem]) -> Self {
        let mut result = Self::default();
        for item in output {
            match item {
                OutputItem::FunctionCall {
                    name, arguments, ..
                } => {
                    debug!(tool = %name, args = %arguments, "Using tool");
                    let arguments = serde_json::from_str(arguments).unwrap_or_else(|e| {
                        warn!(tool = %name, error = %e, "Tool arguments are not valid JSON");
                        Value::Null
                    });
                    result.tool_calls.push(ToolInvocation {
                        name: name.clone(),
                        arguments,
                    });
                }
                OutputItem::Message { text } => {
                    let text = text.clone().unwrap_or_default();
                    debug!(text = %text, "Text response");
                    result.text = text;
                }
                OutputItem::Other { kind } => {
                    debug!(kind = %kind, "Skipping unrecognized output item");
                }
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty() && self.text.is_empty()
    }

    /// Body of the first `draft_response` call, if it is well formed.
    ///
    /// Calls to other tools are passed over, so a tag call ahead of the
    /// draft does not hide it.
    pub fn first_draft(&self) -> Result<String, ToolError> {
        let call = self
            .tool_calls
            .iter()
            .find(|c| c.name == DRAFT_RESPONSE)
            .ok_or_else(|| ToolError::InvalidParameters {
                name: DRAFT_RESPONSE.to_string(),
                reason: "no draft_response call in result".to_string(),
            })?;
        match call.action()? {
            EmailAction::DraftResponse { draft_email_body } => Ok(draft_email_body),
            other => Err(ToolError::InvalidParameters {
                name: other.tool_name().to_string(),
                reason: "not a draft".to_string(),
            }),
        }
    }
}
