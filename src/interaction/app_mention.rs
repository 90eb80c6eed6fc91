//! Replies to @-mentions of the bot.

use tracing::{error, info, instrument};

use crate::{
    base::{
        prompts,
        types::{CompletionRequest, OutgoingMessage, Void},
    },
    runtime::Runtime,
};

use super::{context, event::MentionEvent, text};

/// Handles an app mention.
///
/// Every reply, including the apology on failure, is threaded under the
/// mentioning message.
#[instrument(skip_all)]
pub async fn handle_app_mention(event: MentionEvent, runtime: &Runtime) -> Void {
    info!("App mention received in {}", event.channel);

    if let Err(err) = handle_app_mention_internal(&event, runtime).await {
        error!("Error handling app mention: {}", err);

        let apology = OutgoingMessage::threaded(&event.channel, &event.ts, prompts::MENTION_APOLOGY);
        runtime.chat.post_message(&apology).await?;
    }

    Ok(())
}

async fn handle_app_mention_internal(event: &MentionEvent, runtime: &Runtime) -> Void {
    let mention_text = text::strip_mentions(&event.text);

    // A bare mention gets a greeting, without a model call.

    if mention_text.is_empty() {
        let greeting = OutgoingMessage::threaded(&event.channel, &event.ts, prompts::MENTION_GREETING);
        return runtime.chat.post_message(&greeting).await;
    }

    // Get conversation history from the thread, if there is one.

    let history = match &event.thread_ts {
        Some(thread_ts) => context::get_thread_history(runtime, &event.channel, thread_ts, &event.ts).await,
        None => None,
    };

    let request = CompletionRequest {
        channel: event.channel.clone(),
        user: event.user.clone(),
        text: mention_text,
        thread_ts: event.thread_ts.clone(),
        history: history.unwrap_or_default(),
    };

    let response = runtime.llm.generate(&request).await?;

    let reply = OutgoingMessage::threaded(&event.channel, &event.ts, response);
    runtime.chat.post_message(&reply).await
}
