//! Mail Triage: LLM-driven email triage core.

pub mod agent;
pub mod config;
pub mod email;
pub mod error;
pub mod inbox;
pub mod llm;
pub mod prompts;
pub mod tools;
