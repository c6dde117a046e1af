//! Email data model.
//!
//! The triage core reads `body`/`full_body` and writes `processed`, `state`,
//! `drafted_response` and `tags`. Two kinds of fields are mutated:
//!
//! - `state` is an append-only history of applied actions (duplicates allowed
//!   across repeated runs).
//! - `drafted_response` and `tags` hold the latest value and are overwritten.

mod parse;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EmailError;

/// A display name + address pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One entry in an email's action history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailState {
    DraftedResponse,
    Tagged,
    Archived,
}

impl EmailState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DraftedResponse => "drafted_response",
            Self::Tagged => "tagged",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for EmailState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An email under triage. Owned by the caller; the agent mutates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    /// Primary text content.
    #[serde(default)]
    pub body: String,
    /// Raw content, used when `body` is empty.
    #[serde(default)]
    pub full_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub from: Vec<Mailbox>,
    #[serde(default)]
    pub to: Vec<Mailbox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Set once the triage loop has run, whatever the outcome.
    #[serde(default)]
    pub processed: bool,
    /// Append-only.
    #[serde(default)]
    pub state: Vec<EmailState>,
    /// Latest draft; overwritten by each draft action.
    #[serde(default)]
    pub drafted_response: Option<String>,
    /// Latest tag set; overwritten (never merged) by each tag action.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Email {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        full_body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
            full_body: full_body.into(),
            html: None,
            from: Vec::new(),
            to: Vec::new(),
            date: None,
            processed: false,
            state: Vec::new(),
            drafted_response: None,
            tags: None,
        }
    }

    pub fn with_from(mut self, mailbox: Mailbox) -> Self {
        self.from.push(mailbox);
        self
    }

    /// Text the agent reads: `body`, falling back to `full_body` when empty.
    pub fn body_text(&self) -> &str {
        if self.body.is_empty() {
            &self.full_body
        } else {
            &self.body
        }
    }

    /// Same as `body_text`, but writes the fallback back into `body` so
    /// repeated calls are no-ops.
    pub fn resolve_body(&mut self) -> &str {
        if self.body.is_empty() {
            self.body = self.full_body.clone();
        }
        &self.body
    }

    /// Forget all triage results so the email can be processed again.
    pub fn reset(&mut self) {
        self.processed = false;
        self.state.clear();
        self.drafted_response = None;
    }

    /// First sender address, if any.
    pub fn sender(&self) -> Option<&str> {
        self.from.first().map(|m| m.address.as_str())
    }

    /// Parse a raw RFC 822 message.
    pub fn from_rfc822(raw: &[u8]) -> Result<Self, EmailError> {
        parse::parse_rfc822(raw)
    }

    /// Load an email from disk: `.json` files are deserialized directly,
    /// anything else is parsed as a raw RFC 822 message.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EmailError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Self::from_rfc822(&bytes)
        }
    }
}
