//! Chat service integration for trail-bot.
//!
//! This module provides functionality for interacting with chat platforms like Slack:
//! - Receiving events and slash commands
//! - Posting messages and ephemeral command replies
//! - Retrieving thread history and single messages
//! - Raw Web API calls for endpoints without a typed client (canvases)
//!
//! It defines the `GenericChatClient` trait that can be implemented for different
//! chat services, with a default implementation for Slack.

pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    base::types::{ChatMessage, OutgoingMessage, Res, Void},
    runtime::Runtime,
};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the trail-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and dispatches every
    /// incoming event against the provided runtime until shutdown is requested.
    async fn start(&self, runtime: Runtime) -> Void;

    /// Ask the platform which user the bot credentials belong to.
    async fn bot_user_id(&self) -> Res<String>;

    /// Post a message into a channel, optionally inside a thread.
    async fn post_message(&self, message: &OutgoingMessage) -> Void;

    /// Get the most recent `limit` messages of the thread anchored at `thread_ts`, oldest first.
    async fn get_thread_replies(&self, channel_id: &str, thread_ts: &str, limit: u16) -> Res<Vec<ChatMessage>>;

    /// Get the single message at or before `ts` (inclusive).
    async fn get_message(&self, channel_id: &str, ts: &str) -> Res<Option<ChatMessage>>;

    /// Reply to a slash command, visible only to the invoking user.
    async fn respond_ephemeral(&self, response_url: &str, text: &str) -> Void;

    /// Call a Web API method with a JSON payload and return the raw JSON response.
    async fn call_api(&self, method: &str, payload: &Value) -> Res<Value>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
