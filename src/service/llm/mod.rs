//! Integration with Large Language Model services.
//!
//! This module provides the response generator used by every handler:
//! - `generate` answers a user message, optionally with prior conversation turns
//! - `summarize` condenses a single piece of text
//!
//! The module defines the `GenericLlmClient` trait that can be implemented
//! for different LLM providers, with a default implementation for OpenAI.

pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{instrument, warn};

use crate::base::{
    config::Config,
    prompts,
    types::{CompletionPrompt, CompletionRequest, ConversationTurn},
};

/// Output cap for conversational replies.
pub const GENERATE_MAX_TOKENS: u32 = 1000;

/// Output cap for summaries.
pub const SUMMARY_MAX_TOKENS: u32 = 300;

// Errors.

/// Failure of a single completion call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The call to the provider failed.
    #[error("Failed to generate AI response: {0}")]
    Upstream(String),
    /// The provider answered without any text.
    #[error("The AI response contained no content.")]
    NoContent,
}

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to be used with the trail-bot.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Send one completion request and return the text of the first choice.
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, GenerationError>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
    system_directive: Arc<str>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>, config: &Config) -> Self {
        Self {
            inner,
            system_directive: Arc::from(config.system_directive.as_str()),
        }
    }

    /// Generate a reply to the request, using its history as prior turns.
    #[instrument(skip_all)]
    pub async fn generate(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let prompt = build_generate_prompt(&self.system_directive, request);

        match self.complete(&prompt).await {
            Err(GenerationError::NoContent) => {
                warn!("Completion returned no content, using fallback reply.");
                Ok(prompts::GENERATE_FALLBACK.to_string())
            }
            result => result,
        }
    }

    /// Produce a brief summary of `text`.
    #[instrument(skip_all)]
    pub async fn summarize(&self, text: &str) -> Result<String, GenerationError> {
        let prompt = build_summary_prompt(text);

        match self.complete(&prompt).await {
            Err(GenerationError::NoContent) => {
                warn!("Completion returned no content, using fallback summary.");
                Ok(prompts::SUMMARY_FALLBACK.to_string())
            }
            result => result,
        }
    }
}

/// Assemble `[system] + history + [user]` for a conversational reply.
pub fn build_generate_prompt(system_directive: &str, request: &CompletionRequest) -> CompletionPrompt {
    let mut turns = Vec::with_capacity(request.history.len() + 2);

    turns.push(ConversationTurn::system(system_directive));
    turns.extend(request.history.iter().cloned());
    turns.push(ConversationTurn::user(request.text.as_str()));

    CompletionPrompt {
        turns,
        max_tokens: GENERATE_MAX_TOKENS,
    }
}

/// Assemble the single-turn summary prompt.
pub fn build_summary_prompt(text: &str) -> CompletionPrompt {
    CompletionPrompt {
        turns: vec![ConversationTurn::system(prompts::SUMMARY_SYSTEM_DIRECTIVE), ConversationTurn::user(prompts::summary_request(text))],
        max_tokens: SUMMARY_MAX_TOKENS,
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::types::Role;

    #[test]
    fn test_generate_prompt_orders_system_history_user() {
        let request = CompletionRequest {
            channel: "C1".to_string(),
            user: "U1".to_string(),
            text: "and now?".to_string(),
            thread_ts: Some("1.0".to_string()),
            history: vec![ConversationTurn::user("first"), ConversationTurn::assistant("reply")],
        };

        let prompt = build_generate_prompt("persona", &request);

        assert_eq!(prompt.max_tokens, 1000);
        assert_eq!(
            prompt.turns,
            vec![
                ConversationTurn::system("persona"),
                ConversationTurn::user("first"),
                ConversationTurn::assistant("reply"),
                ConversationTurn::user("and now?"),
            ]
        );
    }

    #[test]
    fn test_generate_prompt_without_history() {
        let request = CompletionRequest {
            text: "hello".to_string(),
            ..Default::default()
        };

        let prompt = build_generate_prompt("persona", &request);

        assert_eq!(prompt.turns.len(), 2);
        assert_eq!(prompt.turns[0].role, Role::System);
        assert_eq!(prompt.turns[1], ConversationTurn::user("hello"));
    }

    #[test]
    fn test_summary_prompt_is_single_turn() {
        let prompt = build_summary_prompt("long text");

        assert_eq!(prompt.max_tokens, 300);
        assert_eq!(prompt.turns[0], ConversationTurn::system(prompts::SUMMARY_SYSTEM_DIRECTIVE));
        assert_eq!(prompt.turns[1].content, "Please provide a brief summary of the following text:\n\nlong text");
    }
}
