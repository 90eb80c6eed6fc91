//! Conversation context lookups.
//!
//! Both lookups degrade to "nothing found" on failure: callers proceed without
//! context instead of failing the whole event.

use tracing::{instrument, warn};

use crate::{
    base::types::{ChatMessage, ConversationTurn, Res},
    runtime::Runtime,
};

/// Maximum number of thread replies fetched as history.
pub const THREAD_HISTORY_LIMIT: u16 = 50;

/// The text and author of a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub text: String,
    pub user: Option<String>,
}

/// Get the turns of the thread anchored at `thread_ts`, oldest first.
///
/// Messages without text are skipped, as is the message at `exclude_ts` (the one
/// being answered).  Messages authored by the bot become assistant turns.
/// Returns `None` when the thread is empty or any lookup fails.
#[instrument(skip(runtime))]
pub async fn get_thread_history(runtime: &Runtime, channel_id: &str, thread_ts: &str, exclude_ts: &str) -> Option<Vec<ConversationTurn>> {
    match get_thread_history_internal(runtime, channel_id, thread_ts, exclude_ts).await {
        Ok(history) if history.is_empty() => None,
        Ok(history) => Some(history),
        Err(err) => {
            warn!("Error fetching thread history: {}", err);
            None
        }
    }
}

async fn get_thread_history_internal(runtime: &Runtime, channel_id: &str, thread_ts: &str, exclude_ts: &str) -> Res<Vec<ConversationTurn>> {
    let messages = runtime.chat.get_thread_replies(channel_id, thread_ts, THREAD_HISTORY_LIMIT).await?;

    if messages.is_empty() {
        return Ok(Vec::new());
    }

    let bot_user_id = runtime.identity.resolve(&runtime.chat).await?;

    Ok(to_turns(messages, &bot_user_id, exclude_ts))
}

/// Map platform messages to conversation turns, preserving order.
pub fn to_turns(messages: Vec<ChatMessage>, bot_user_id: &str, exclude_ts: &str) -> Vec<ConversationTurn> {
    messages
        .into_iter()
        .filter(|message| message.ts != exclude_ts)
        .filter_map(|message| {
            let text = message.text.filter(|text| !text.is_empty())?;

            if message.user.as_deref() == Some(bot_user_id) {
                Some(ConversationTurn::assistant(text))
            } else {
                Some(ConversationTurn::user(text))
            }
        })
        .collect()
}

/// Get the single message at `ts`.
///
/// Returns `None` when the message is missing, has no text, or the lookup fails.
/// The lookup may answer with an older message (the one at `ts` is a thread reply
/// or was deleted); that counts as missing.
#[instrument(skip(runtime))]
pub async fn get_message_context(runtime: &Runtime, channel_id: &str, ts: &str) -> Option<MessageContext> {
    match runtime.chat.get_message(channel_id, ts).await {
        Ok(message) => message.filter(|message| message.ts == ts).and_then(|message| {
            let text = message.text.filter(|text| !text.is_empty())?;
            Some(MessageContext { text, user: message.user })
        }),
        Err(err) => {
            warn!("Error fetching message context: {}", err);
            None
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn message(ts: &str, user: Option<&str>, text: Option<&str>) -> ChatMessage {
        ChatMessage {
            ts: ts.to_string(),
            user: user.map(str::to_string),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_to_turns_tags_roles_and_keeps_order() {
        let messages = vec![
            message("1.0", Some("U1"), Some("question")),
            message("2.0", Some("UBOT"), Some("answer")),
            message("3.0", Some("U2"), None),
            message("4.0", None, Some("system notice")),
            message("5.0", Some("U1"), Some("")),
            message("6.0", Some("U1"), Some("follow-up")),
        ];

        assert_eq!(
            to_turns(messages, "UBOT", "7.0"),
            vec![
                ConversationTurn::user("question"),
                ConversationTurn::assistant("answer"),
                ConversationTurn::user("system notice"),
                ConversationTurn::user("follow-up"),
            ]
        );
    }

    #[test]
    fn test_to_turns_excludes_triggering_message() {
        let messages = vec![message("1.0", Some("U1"), Some("root")), message("2.0", Some("U1"), Some("the trigger"))];

        assert_eq!(to_turns(messages, "UBOT", "2.0"), vec![ConversationTurn::user("root")]);
    }
}
