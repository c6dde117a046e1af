//! Triage agent: prompt → inference → normalized result → email mutations.
//!
//! Flow per email:
//! 1. Compose the triage prompt from the agent config and the email text
//! 2. One inference round-trip with the tool catalog attached
//! 3. Mark the email processed (always)
//! 4. Apply each valid tool invocation in the order the model returned them
//!
//! The email is only touched after the inference call resolves, so dropping
//! an in-flight future leaves it unchanged. Inference and argument failures
//! degrade to "no effect"; only construction can fail.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::decision::DecisionResult;
use crate::config::AgentConfig;
use crate::email::{Email, EmailState};
use crate::error::{ConfigError, LlmError};
use crate::llm::{
    ChatMessage, LlmConfig, LlmProvider, ToolCompletionRequest, create_provider, estimate_cost,
};
use crate::prompts::PromptTemplates;
use crate::tools::ToolCatalog;

/// What one `process_email` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageOutcome {
    /// State entries appended, in application order.
    pub applied: Vec<EmailState>,
    /// Tool names that were returned but not applied (unknown or malformed).
    pub skipped: Vec<String>,
    /// Free text from the model.
    pub text: String,
    /// The inference call failed and nothing was applied.
    pub inference_failed: bool,
}

/// Decides what to do with an email and applies it.
pub struct TriageAgent {
    llm: Arc<dyn LlmProvider>,
    config: AgentConfig,
    catalog: Arc<ToolCatalog>,
    templates: Arc<PromptTemplates>,
}

impl TriageAgent {
    /// Create an agent over an existing provider with the shared catalog and
    /// templates.
    pub fn new(llm: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self {
            llm,
            config,
            catalog: ToolCatalog::shared(),
            templates: PromptTemplates::shared(),
        }
    }

    /// Create the provider from configuration, then the agent.
    pub fn from_config(llm_config: &LlmConfig, config: AgentConfig) -> Result<Self, ConfigError> {
        let llm = create_provider(llm_config)?;
        Ok(Self::new(llm, config))
    }

    pub fn with_catalog(mut self, catalog: Arc<ToolCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_templates(mut self, templates: Arc<PromptTemplates>) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.config.instructions = instructions.into();
    }

    pub fn set_writing_prompt(&mut self, writing_prompt: impl Into<String>) {
        self.config.writing_prompt = writing_prompt.into();
    }

    pub fn set_research_prompt(&mut self, research_prompt: impl Into<String>) {
        self.config.research_prompt = research_prompt.into();
    }

    /// One inference round-trip: system framing + prompt, with tools attached.
    pub async fn invoke(&self, prompt: &str) -> Result<DecisionResult, LlmError> {
        let request = ToolCompletionRequest::new(
            vec![
                ChatMessage::system(&self.templates.system),
                ChatMessage::user(prompt),
            ],
            self.catalog.definitions().to_vec(),
        );

        let response = self.llm.complete_with_tools(request).await?;

        let cost = estimate_cost(
            self.llm.cost_per_token(),
            response.input_tokens,
            response.output_tokens,
        );
        debug!(
            model = self.llm.model_name(),
            items = response.output.len(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = %cost,
            "Inference complete"
        );

        Ok(DecisionResult::from_output(&response.output))
    }

    /// Run the full triage path on one email.
    pub async fn process_email(&self, email: &mut Email) -> TriageOutcome {
        let prompt = self.templates.compose_triage_prompt(
            &self.config.instructions,
            &self.config.writing_prompt,
            email.body_text(),
        );

        let result = match self.invoke(&prompt).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(email_id = %email.id, error = %e, "Triage inference failed");
                None
            }
        };

        email.resolve_body();
        email.processed = true;

        let mut outcome = TriageOutcome {
            inference_failed: result.is_none(),
            ..Default::default()
        };
        match result {
            Some(result) if result.is_empty() => {
                debug!(email_id = %email.id, "Empty decision result");
            }
            Some(result) => {
                for call in &result.tool_calls {
                    match call.action() {
                        Ok(action) => outcome.applied.push(action.apply_to(email)),
                        Err(e) => {
                            warn!(email_id = %email.id, tool = %call.name, error = %e, "Skipping tool call");
                            outcome.skipped.push(call.name.clone());
                        }
                    }
                }
                outcome.text = result.text;
            }
            None => {}
        }

        info!(
            email_id = %email.id,
            applied = outcome.applied.len(),
            skipped = outcome.skipped.len(),
            "Email processed"
        );
        outcome
    }

    /// Draft-only path. Returns an empty string when no usable draft comes back.
    pub async fn generate_draft(&self, email: &mut Email) -> String {
        let prompt = self
            .templates
            .compose_draft_prompt(&self.config.writing_prompt, email.body_text());

        let result = self.invoke(&prompt).await;
        email.resolve_body();

        let draft = result
            .map_err(|e| e.to_string())
            .and_then(|r| r.first_draft().map_err(|e| e.to_string()));
        match draft {
            Ok(draft) => draft,
            Err(reason) => {
                debug!(email_id = %email.id, reason = %reason, "No draft generated");
                String::new()
            }
        }
    }

    /// Triage several emails concurrently. Outcomes are in input order.
    pub async fn process_batch(&self, emails: &mut [Email]) -> Vec<TriageOutcome> {
        info!(count = emails.len(), "Processing email batch");
        join_all(emails.iter_mut().map(|email| self.process_email(email))).await
    }
}
