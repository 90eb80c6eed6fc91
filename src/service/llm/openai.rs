//! OpenAI chat-completion implementation of the LLM client.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ReasoningEffort,
    },
};
use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::base::{
    config::Config,
    types::{CompletionPrompt, ConversationTurn, Res, Role},
};

use super::{GenerationError, GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Res<Self> {
        let client = OpenAiLlmClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    reasoning_effort: ReasoningEffort,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Ok(Self {
            client: Client::with_config(cfg),
            model: config.openai_model.clone(),
            reasoning_effort: parse_openai_reasoning_effort(&config.openai_reasoning_effort)?,
        })
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, GenerationError> {
        let messages = prompt
            .turns
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_completion_tokens(prompt.max_tokens)
            .reasoning_effort(self.reasoning_effort.clone())
            .build()
            .map_err(|e| GenerationError::Upstream(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!("OpenAI API error: {}", e);
            GenerationError::Upstream(e.to_string())
        })?;

        info!("LLM response has {} choices.", response.choices.len());

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::NoContent)
    }
}

/// Convert a conversation turn into the OpenAI request message of the same role.
fn to_openai_message(turn: &ConversationTurn) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = turn.content.clone();

    let message = match turn.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default().content(content).build()?.into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default().content(content).build()?.into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default().content(content).build()?.into(),
    };

    Ok(message)
}

/// Convert a string reasoning effort to ReasoningEffort enum.
fn parse_openai_reasoning_effort(effort: &str) -> Res<ReasoningEffort> {
    match effort.to_lowercase().as_str() {
        "low" => Ok(ReasoningEffort::Low),
        "medium" => Ok(ReasoningEffort::Medium),
        "high" => Ok(ReasoningEffort::High),
        _ => Err(crate::base::types::Err::msg(format!("Invalid reasoning effort: {effort}. Must be one of: low, medium, high"))),
    }
}

// Tests.
