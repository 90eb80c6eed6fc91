//! Slack implementation of the chat client.
//!
//! Typed Web API calls and the socket mode listener go through `slack-morphism`.
//! Endpoints it does not model (canvases, command `response_url` replies) are
//! plain JSON requests through `reqwest`.

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, OutgoingMessage, Res, Void},
    },
    interaction::{event, router},
    runtime::{self, Runtime},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::{Value, json};
use slack_morphism::{errors::SlackClientError, prelude::*};
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Base URL for raw Web API calls.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Page size for `conversations.replies`.
const REPLIES_PAGE_SIZE: u16 = 200;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    runtime: Runtime,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    bot_token_secret: String,
    client: Arc<FullClient>,
    http: reqwest::Client,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    ///
    /// No request is made here: the bot identity is resolved lazily on first use.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        Ok(Self {
            app_token,
            bot_token,
            bot_token_secret: config.slack_bot_token.clone(),
            client,
            http: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self, runtime: Runtime) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.client.clone())
                .with_error_handler(handle_listener_error)
                .with_user_state(SlackUserState { runtime }),
        );

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Open the WS connections, then hold until a termination signal arrives.
        socket_mode_listener.start().await;
        info!("Listening for events ...");

        runtime::shutdown_signal().await?;

        info!("Shutdown requested, stopping the listener ...");
        socket_mode_listener.shutdown().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn bot_user_id(&self) -> Res<String> {
        let session = self.client.open_session(&self.bot_token);
        let bot_user = session.auth_test().await?;

        Ok(bot_user.user_id.0)
    }

    #[instrument(skip(self))]
    async fn post_message(&self, message: &OutgoingMessage) -> Void {
        let content = SlackMessageContent::new().with_text(message.text.clone());

        let mut request = SlackApiChatPostMessageRequest::new(SlackChannelId(message.channel.clone()), content).with_link_names(true);

        if let Some(thread_ts) = &message.thread_ts {
            request = request.with_thread_ts(SlackTs(thread_ts.clone()));
        }

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_thread_replies(&self, channel_id: &str, thread_ts: &str, limit: u16) -> Res<Vec<ChatMessage>> {
        let session = self.client.open_session(&self.bot_token);

        // Replies come oldest first, so page through to the end of the thread.

        let mut messages = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        loop {
            let mut request =
                SlackApiConversationsRepliesRequest::new(SlackChannelId(channel_id.to_string()), SlackTs(thread_ts.to_string())).with_limit(REPLIES_PAGE_SIZE);

            if let Some(cursor) = cursor.take() {
                request = request.with_cursor(cursor);
            }

            let response = session.conversations_replies(&request).await;

            let response = if let Err(e) = &response
                && let SlackClientError::ApiError(ae) = e
                && ae.code == "thread_not_found"
            {
                // A top-level message has no thread yet.
                return Ok(Vec::new());
            } else {
                response?
            };

            messages.extend(response.messages.into_iter().map(to_chat_message));
            keep_most_recent(&mut messages, limit as usize);

            cursor = response.response_metadata.and_then(|metadata| metadata.next_cursor).filter(|cursor| !cursor.0.is_empty());

            if cursor.is_none() {
                break;
            }
        }

        Ok(messages)
    }

    #[instrument(skip(self))]
    async fn get_message(&self, channel_id: &str, ts: &str) -> Res<Option<ChatMessage>> {
        let request = SlackApiConversationsHistoryRequest::new()
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_latest(SlackTs(ts.to_string()))
            .with_inclusive(true)
            .with_limit(1);

        let session = self.client.open_session(&self.bot_token);
        let response = session.conversations_history(&request).await?;

        Ok(response.messages.into_iter().next().map(to_chat_message))
    }

    #[instrument(skip(self, text))]
    async fn respond_ephemeral(&self, response_url: &str, text: &str) -> Void {
        self.http
            .post(response_url)
            .json(&json!({ "response_type": "ephemeral", "text": text }))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("Failed to respond to command: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self, payload))]
    async fn call_api(&self, method: &str, payload: &Value) -> Res<Value> {
        let response = self
            .http
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(&self.bot_token_secret)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Value>().await?)
    }
}

/// Drop all but the last `limit` messages.
fn keep_most_recent(messages: &mut Vec<ChatMessage>, limit: usize) {
    if messages.len() > limit {
        messages.drain(..messages.len() - limit);
    }
}

/// Convert a history entry into the platform-neutral message shape.
fn to_chat_message(message: SlackHistoryMessage) -> ChatMessage {
    ChatMessage {
        ts: message.origin.ts.0,
        user: message.sender.user.map(|user| user.0),
        text: message.content.text,
    }
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
///
/// The returned response is the acknowledgement: it is sent before any slow work
/// starts, and the real reply goes through the command's `response_url`.
#[instrument(skip_all)]
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    info!("Received command event: {}", event.command.0);

    let command = event::CommandEvent {
        command: event.command.0.clone(),
        text: event.text.clone().unwrap_or_default(),
        channel: event.channel_id.0.clone(),
        user: event.user_id.0.clone(),
        response_url: event.response_url.0.to_string(),
    };

    router::dispatch(event::InboundEvent::Command(command), user_state.runtime.clone());

    Ok(SlackCommandEventResponse {
        content: SlackMessageContent::new(),
        response_type: Some(SlackMessageResponseType::Ephemeral),
    })
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    let payload = serde_json::to_value(&event_callback.event)?;
    debug!("Incoming event: {}", payload.get("type").and_then(serde_json::Value::as_str).unwrap_or("unknown"));

    match event::parse_push_event(&payload) {
        Some(event) => router::dispatch(event, user_state.runtime.clone()),
        None => debug!("Dropping push event without a handler."),
    }

    Ok(())
}

/// Logs listener-level errors; every handler already deals with its own failures.
fn handle_listener_error(err: Box<dyn std::error::Error + Send + Sync>, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> HttpStatusCode {
    warn!("Slack socket mode error: {}", err);
    HttpStatusCode::OK
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(count: usize) -> Vec<ChatMessage> {
        (0..count)
            .map(|i| ChatMessage {
                ts: format!("{i}.0"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_keep_most_recent_keeps_the_tail_in_order() {
        let mut thread = messages(120);

        keep_most_recent(&mut thread, 50);

        assert_eq!(thread.len(), 50);
        assert_eq!(thread.first().map(|m| m.ts.as_str()), Some("70.0"));
        assert_eq!(thread.last().map(|m| m.ts.as_str()), Some("119.0"));
    }

    #[test]
    fn test_keep_most_recent_leaves_short_threads_alone() {
        let mut thread = messages(3);

        keep_most_recent(&mut thread, 50);

        assert_eq!(thread, messages(3));
    }
}
