//! Static replies on the assistant surface.

use tracing::{info, instrument};

use crate::{
    base::{
        prompts,
        types::{OutgoingMessage, Void},
    },
    runtime::Runtime,
};

use super::event::AssistantThreadEvent;

/// Greets the user when an assistant thread opens.
#[instrument(skip_all)]
pub async fn handle_thread_started(event: AssistantThreadEvent, runtime: &Runtime) -> Void {
    info!("Assistant thread started in {}", event.channel);

    let greeting = OutgoingMessage::threaded(&event.channel, &event.thread_ts, prompts::ASSISTANT_THREAD_GREETING);
    runtime.chat.post_message(&greeting).await
}

/// Acknowledges a message in an assistant thread.
#[instrument(skip_all)]
pub async fn handle_thread_message(event: AssistantThreadEvent, runtime: &Runtime) -> Void {
    let reply = OutgoingMessage::threaded(&event.channel, &event.thread_ts, thread_reply(event.text.as_deref()));
    runtime.chat.post_message(&reply).await
}

fn thread_reply(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => prompts::assistant_thread_echo(text),
        None => prompts::ASSISTANT_THREAD_UNREADABLE.to_string(),
    }
}

// Tests.
