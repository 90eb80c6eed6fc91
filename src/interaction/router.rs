//! Routes inbound events to their handlers.

use tracing::{Instrument, debug, error, instrument};

use crate::{base::types::Void, runtime::Runtime};

use super::{
    app_mention::handle_app_mention,
    assistant_thread::{handle_thread_message, handle_thread_started},
    canvas_command::handle_command,
    event::InboundEvent,
    message::handle_message,
    reaction::handle_reaction,
};

/// Handle `event` on its own task.
///
/// Returns immediately; the listener never waits on a handler.
#[instrument(skip_all)]
pub fn dispatch(event: InboundEvent, runtime: Runtime) {
    tokio::spawn(async move {
        // Process the event.
        let result = route(event, &runtime).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Handle `event` to completion on the current task.
pub async fn route(event: InboundEvent, runtime: &Runtime) -> Void {
    debug!("Routing {}", event_kind(&event));

    match event {
        InboundEvent::Mention(event) => handle_app_mention(event, runtime).await,
        InboundEvent::Message(event) => handle_message(event, runtime).await,
        InboundEvent::Reaction(event) => handle_reaction(event, runtime).await,
        InboundEvent::Command(event) => handle_command(event, runtime).await,
        InboundEvent::AssistantThreadStarted(event) => handle_thread_started(event, runtime).await,
        InboundEvent::AssistantThreadMessage(event) => handle_thread_message(event, runtime).await,
    }
}

fn event_kind(event: &InboundEvent) -> &'static str {
    match event {
        InboundEvent::Mention(_) => "app mention",
        InboundEvent::Message(_) => "message",
        InboundEvent::Reaction(_) => "reaction",
        InboundEvent::Command(_) => "slash command",
        InboundEvent::AssistantThreadStarted(_) => "assistant thread start",
        InboundEvent::AssistantThreadMessage(_) => "assistant thread message",
    }
}
