//! Replies to direct messages and to channel messages that mention the bot.

use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        prompts,
        types::{CompletionRequest, OutgoingMessage, Void},
    },
    runtime::Runtime,
};

use super::{
    context,
    event::{MessageEvent, MessageOrigin},
    text,
};

/// Handles a message event.
#[instrument(skip_all)]
pub async fn handle_message(event: MessageEvent, runtime: &Runtime) -> Void {
    // Ignore bot messages, edits, and messages without text.

    let Some(raw_text) = event.text.as_deref().filter(|t| !t.is_empty()) else {
        debug!("Message ignored: no text.");
        return Ok(());
    };

    if matches!(event.origin, MessageOrigin::Bot | MessageOrigin::Edited) {
        debug!("Message ignored: {:?} message.", event.origin);
        return Ok(());
    }

    // Only respond in direct messages, or when explicitly mentioned.

    if !event.is_direct() {
        let bot_user_id = match runtime.identity.resolve(&runtime.chat).await {
            Ok(id) => id,
            Err(err) => {
                warn!("Message ignored: unable to resolve the bot user ID: {}", err);
                return Ok(());
            }
        };

        if !text::mentions_user(raw_text, &bot_user_id) {
            debug!("Message ignored: not direct and not mentioning the bot.");
            return Ok(());
        }
    }

    // Never answer our own messages.

    if event.user.is_some() && event.user.as_deref() == runtime.identity.get() {
        debug!("Message ignored: sent by the bot.");
        return Ok(());
    }

    info!("Processing message in {}, direct: {}", event.channel, event.is_direct());

    if let Err(err) = handle_message_internal(&event, raw_text, runtime).await {
        error!("Error handling message: {}", err);

        let apology = OutgoingMessage::root(&event.channel, prompts::MESSAGE_APOLOGY);
        runtime.chat.post_message(&apology).await?;
    }

    Ok(())
}

async fn handle_message_internal(event: &MessageEvent, raw_text: &str, runtime: &Runtime) -> Void {
    let message_text = text::strip_mentions(raw_text);

    if message_text.is_empty() {
        return Ok(());
    }

    // Get conversation history if in a thread.

    let history = match &event.thread_ts {
        Some(thread_ts) => context::get_thread_history(runtime, &event.channel, thread_ts, &event.ts).await,
        None => None,
    };

    let request = CompletionRequest {
        channel: event.channel.clone(),
        user: event.user.clone().unwrap_or_default(),
        text: message_text,
        thread_ts: event.thread_ts.clone(),
        history: history.unwrap_or_default(),
    };

    let response = runtime.llm.generate(&request).await?;

    let reply = OutgoingMessage::threaded(&event.channel, reply_thread(event), response);
    runtime.chat.post_message(&reply).await
}

/// The thread a reply to `event` belongs in.
///
/// A message already in a thread is answered in that thread; a root message
/// becomes the anchor of a new thread.
pub fn reply_thread(event: &MessageEvent) -> &str {
    event.thread_ts.as_deref().unwrap_or(&event.ts)
}

// Tests.
