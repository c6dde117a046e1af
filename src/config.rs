//! Configuration types.

/// Default triage policy: when the agent should act on an email.
pub const DEFAULT_INSTRUCTIONS: &str = "Create a draft response to any email that is specifically \
asking for a response and is not a marketing email or spam.";

/// Default style guidance for drafted replies.
pub const DEFAULT_WRITING_PROMPT: &str = "Write a concise but friendly response.";

/// Default prompt for sender research. Not used by the triage loop.
pub const DEFAULT_RESEARCH_PROMPT: &str = "You are an expert people researcher. You'll be \
provided an email and your goal is to create a snippet to summarize information about the \
sender. you can use the domain to understand the organization if it isn't a large email \
provider, and you can use web search to get info on them.";

/// Agent configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Policy for when to act on an email.
    pub instructions: String,
    /// Style guidance for drafted text.
    pub writing_prompt: String,
    /// Reserved for a sender-research capability.
    pub research_prompt: String,
}

impl AgentConfig {
    /// Defaults overlaid with `TRIAGE_INSTRUCTIONS`, `TRIAGE_WRITING_PROMPT`
    /// and `TRIAGE_RESEARCH_PROMPT` when they are set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_non_empty("TRIAGE_INSTRUCTIONS") {
            config.instructions = v;
        }
        if let Some(v) = env_non_empty("TRIAGE_WRITING_PROMPT") {
            config.writing_prompt = v;
        }
        if let Some(v) = env_non_empty("TRIAGE_RESEARCH_PROMPT") {
            config.research_prompt = v;
        }
        config
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            writing_prompt: DEFAULT_WRITING_PROMPT.to_string(),
            research_prompt: DEFAULT_RESEARCH_PROMPT.to_string(),
        }
    }
}

pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_builtin_prompts() {
        let config = AgentConfig::default();
        assert_eq!(config.instructions, DEFAULT_INSTRUCTIONS);
        assert_eq!(config.writing_prompt, DEFAULT_WRITING_PROMPT);
        assert_eq!(config.research_prompt, DEFAULT_RESEARCH_PROMPT);
    }

    #[test]
    fn research_prompt_text_is_exact() {
        assert_eq!(
            DEFAULT_RESEARCH_PROMPT,
            "You are an expert people researcher. You'll be provided an email and your goal is \
to create a snippet to summarize information about the sender. you can use the domain to \
understand the organization if it isn't a large email provider, and you can use web search to \
get info on them."
        );
    }

    #[test]
    fn from_env_overlays_set_values() {
        // SAFETY: only this test touches TRIAGE_WRITING_PROMPT / TRIAGE_RESEARCH_PROMPT.
        unsafe {
            std::env::set_var("TRIAGE_WRITING_PROMPT", "Be terse.");
            std::env::set_var("TRIAGE_RESEARCH_PROMPT", "   ");
        }
        let config = AgentConfig::from_env();
        assert_eq!(config.writing_prompt, "Be terse.");
        // Blank values are ignored
        assert_eq!(config.research_prompt, DEFAULT_RESEARCH_PROMPT);
        unsafe {
            std::env::remove_var("TRIAGE_WRITING_PROMPT");
            std::env::remove_var("TRIAGE_RESEARCH_PROMPT");
        }
    }
}
