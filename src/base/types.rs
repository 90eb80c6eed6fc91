use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The author role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One role-tagged piece of text in a conversation sent to the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

/// A normalized request for the response generator.
///
/// Built once per handled event.  The `history` never contains the triggering
/// message: its text is carried in `text` and appended last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub thread_ts: Option<String>,
    pub history: Vec<ConversationTurn>,
}

/// A fully assembled prompt, ready to be sent to an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt {
    pub turns: Vec<ConversationTurn>,
    pub max_tokens: u32,
}

/// A platform-hosted canvas document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub url: String,
    pub content: Option<String>,
}

/// A message as returned by the platform's history endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub ts: String,
    pub user: Option<String>,
    pub text: Option<String>,
}

/// A message to be posted into a channel, optionally inside a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel: String,
    pub thread_ts: Option<String>,
    pub text: String,
}

impl OutgoingMessage {
    /// A message posted at the channel root.
    pub fn root(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: None,
            text: text.into(),
        }
    }

    /// A message posted as a reply in the thread anchored at `thread_ts`.
    pub fn threaded(channel: impl Into<String>, thread_ts: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: Some(thread_ts.into()),
            text: text.into(),
        }
    }
}
