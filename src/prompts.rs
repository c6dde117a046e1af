//! Prompt composition for triage and draft-only requests.
//!
//! Templates are plain strings with `{instructions}`, `{response_style}` and
//! `{email}` placeholders. Rendering is a single pass, so text inside a
//! substituted value is never expanded again.

use std::sync::{Arc, LazyLock};

/// System framing sent ahead of every composed prompt.
pub const SYSTEM_FRAMING: &str = "You are a helpful assistant that can help with email.";

/// Template for the full triage decision.
pub const TRIAGE_TEMPLATE: &str = "\
You are a helpful assistant that can help with email.
You are given an email, instructions, and a set of tools to use to act
on the email where applicable.

INSTRUCTIONS:
{instructions}

EMAIL:
{email}

TOOL USAGE INSTRUCTIONS:
- If the email is a marketing email or spam, respond with NO ACTION.
- If the email is not asking for a response, respond with NO ACTION.
- If the email is asking for a response, draft a response and use the draft_response tool to draft a response.
- When drafting a response follow the following principles:
    {response_style}
- When drafting a response do not include placeholders, this includes the user's name, the company's name, or any other placeholder.
- When drafting a response do not include a subject line, this is just the body of the email.

Choose the appropriate tool to use to act on the email or respond with NO ACTION.
";

/// Template for a draft-only request. No tool-selection policy.
pub const DRAFT_TEMPLATE: &str = "\
You are a helpful assistant that can help with email.
You are given an email and your goal is to draft a response to the email based on the following instructions:
{instructions}

EMAIL:
{email}

RESPONSE:
";

static SHARED: LazyLock<Arc<PromptTemplates>> =
    LazyLock::new(|| Arc::new(PromptTemplates::default()));

/// The set of templates an agent renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub system: String,
    pub triage: String,
    pub draft: String,
}

impl PromptTemplates {
    /// Process-wide default templates.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Render the triage prompt.
    pub fn compose_triage_prompt(
        &self,
        instructions: &str,
        response_style: &str,
        email_text: &str,
    ) -> String {
        render(
            &self.triage,
            &[
                ("instructions", instructions),
                ("response_style", response_style),
                ("email", email_text),
            ],
        )
    }

    /// Render the draft-only prompt.
    pub fn compose_draft_prompt(&self, instructions: &str, email_text: &str) -> String {
        render(
            &self.draft,
            &[("instructions", instructions), ("email", email_text)],
        )
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: SYSTEM_FRAMING.to_string(),
            triage: TRIAGE_TEMPLATE.to_string(),
            draft: DRAFT_TEMPLATE.to_string(),
        }
    }
}

/// Compose a triage prompt from the default template.
pub fn compose_triage_prompt(instructions: &str, response_style: &str, email_text: &str) -> String {
    SHARED.compose_triage_prompt(instructions, response_style, email_text)
}

/// Compose a draft-only prompt from the default template.
pub fn compose_draft_prompt(instructions: &str, email_text: &str) -> String {
    SHARED.compose_draft_prompt(instructions, email_text)
}

/// Substitute `{name}` placeholders left to right. Unknown placeholders and
/// stray braces are copied through unchanged.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
