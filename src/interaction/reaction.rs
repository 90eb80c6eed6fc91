//! Summarizes a message when it receives the memo reaction.

use tracing::{debug, error, info, instrument};

use crate::{
    base::types::{OutgoingMessage, Void},
    runtime::Runtime,
};

use super::{context, event::ReactionEvent};

/// Reaction names that request a summary (the short name and the raw emoji).
pub const SUMMARY_REACTIONS: [&str; 2] = ["memo", "📝"];

/// Whether `reaction` asks for a summary.
pub fn is_summary_reaction(reaction: &str) -> bool {
    SUMMARY_REACTIONS.contains(&reaction)
}

/// Handles a reaction.
///
/// Failures are logged and never reported back into the channel.
#[instrument(skip_all)]
pub async fn handle_reaction(event: ReactionEvent, runtime: &Runtime) -> Void {
    if !is_summary_reaction(&event.reaction) {
        debug!("Reaction `{}` ignored.", event.reaction);
        return Ok(());
    }

    if let Err(err) = handle_reaction_internal(&event, runtime).await {
        error!("Error handling reaction: {}", err);
    }

    Ok(())
}

async fn handle_reaction_internal(event: &ReactionEvent, runtime: &Runtime) -> Void {
    let Some(message) = context::get_message_context(runtime, &event.channel, &event.ts).await else {
        debug!("Reacted message has no text, nothing to summarize.");
        return Ok(());
    };

    info!("Summarizing message {} in {}", event.ts, event.channel);

    let summary = runtime.llm.summarize(&message.text).await?;

    let reply = OutgoingMessage::threaded(&event.channel, &event.ts, format!("📝 Summary:\n{summary}"));
    runtime.chat.post_message(&reply).await
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_summary_reaction() {
        assert!(is_summary_reaction("memo"));
        assert!(is_summary_reaction("📝"));
        assert!(!is_summary_reaction("Memo"));
        assert!(!is_summary_reaction("thumbsup"));
        assert!(!is_summary_reaction(""));
    }
}
