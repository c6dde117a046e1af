//! The fixed catalog of tools offered to the model.

use std::sync::{Arc, LazyLock};

use serde_json::json;

use crate::llm::ToolDefinition;

pub const DRAFT_RESPONSE: &str = "draft_response";
pub const ADD_TAGS: &str = "add_tags";
pub const ARCHIVE_EMAIL: &str = "archive_email";

static SHARED: LazyLock<Arc<ToolCatalog>> = LazyLock::new(|| Arc::new(ToolCatalog::default()));

/// Ordered, immutable set of tool definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    /// Process-wide default catalog.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new(vec![
            strict_tool(
                DRAFT_RESPONSE,
                "Draft a response to the email",
                "draft_email_body",
                json!({
                    "type": "string",
                    "description": "The body of the draft response to the email"
                }),
            ),
            strict_tool(
                ADD_TAGS,
                "Add tags to the email to label it, users may refer to it as tag, label, or categorize",
                "tags",
                json!({
                    "type": "array",
                    "description": "The tags to add to the email",
                    "items": { "type": "string" }
                }),
            ),
            strict_tool(
                ARCHIVE_EMAIL,
                "Archive the email",
                "archive",
                json!({
                    "type": "boolean",
                    "description": "Whether to archive the email"
                }),
            ),
        ])
    }
}

/// A tool with exactly one required property and no additional properties.
fn strict_tool(
    name: &str,
    description: &str,
    property: &str,
    schema: serde_json::Value,
) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": { property: schema },
            "additionalProperties": false,
            "required": [property]
        }),
        strict: true,
    }
}
