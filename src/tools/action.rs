//! Typed email actions and the state transitions they drive.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::catalog::{ADD_TAGS, ARCHIVE_EMAIL, DRAFT_RESPONSE};
use crate::email::{Email, EmailState};
use crate::error::ToolError;

/// One action the model asked for, with arguments already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailAction {
    DraftResponse { draft_email_body: String },
    AddTags { tags: Vec<String> },
    /// `archive` is carried but does not gate the transition (see `apply_to`).
    ArchiveEmail { archive: bool },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DraftResponseArgs {
    draft_email_body: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AddTagsArgs {
    tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArchiveEmailArgs {
    archive: bool,
}

impl EmailAction {
    /// Validate a tool invocation against its argument contract.
    ///
    /// Unknown names and any shape mismatch (missing key, wrong type, extra
    /// keys) are errors; nothing is partially accepted.
    pub fn parse(name: &str, arguments: &serde_json::Value) -> Result<Self, ToolError> {
        match name {
            DRAFT_RESPONSE => {
                let args: DraftResponseArgs = parse_args(name, arguments)?;
                Ok(Self::DraftResponse {
                    draft_email_body: args.draft_email_body,
                })
            }
            ADD_TAGS => {
                let args: AddTagsArgs = parse_args(name, arguments)?;
                Ok(Self::AddTags { tags: args.tags })
            }
            ARCHIVE_EMAIL => {
                let args: ArchiveEmailArgs = parse_args(name, arguments)?;
                Ok(Self::ArchiveEmail {
                    archive: args.archive,
                })
            }
            _ => Err(ToolError::UnknownTool {
                name: name.to_string(),
            }),
        }
    }

    /// Tool name this action came from.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::DraftResponse { .. } => DRAFT_RESPONSE,
            Self::AddTags { .. } => ADD_TAGS,
            Self::ArchiveEmail { .. } => ARCHIVE_EMAIL,
        }
    }

    /// Apply to an email and return the state entry that was appended.
    ///
    /// `state` always grows by one entry. `drafted_response` and `tags` are
    /// replaced outright. Archiving appends `Archived` whatever the value of
    /// `archive`; whether `false` should un-archive is an open question and
    /// deliberately not acted on here.
    pub fn apply_to(&self, email: &mut Email) -> EmailState {
        let entry = match self {
            Self::DraftResponse { draft_email_body } => {
                email.drafted_response = Some(draft_email_body.clone());
                EmailState::DraftedResponse
            }
            Self::AddTags { tags } => {
                email.tags = Some(tags.clone());
                EmailState::Tagged
            }
            Self::ArchiveEmail { .. } => EmailState::Archived,
        };
        email.state.push(entry);
        entry
    }
}

fn parse_args<T: DeserializeOwned>(
    name: &str,
    arguments: &serde_json::Value,
) -> Result<T, ToolError> {
    if !arguments.is_object() {
        return Err(ToolError::InvalidParameters {
            name: name.to_string(),
            reason: "arguments must be a JSON object".to_string(),
        });
    }
    T::deserialize(arguments).map_err(|e| ToolError::InvalidParameters {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
