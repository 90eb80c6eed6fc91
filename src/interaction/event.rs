//! Inbound events, validated once at the platform boundary.
//!
//! Push events arrive as loosely shaped JSON.  They are parsed here into a closed
//! union whose variants carry every coordinate their handler needs, so handlers
//! never re-check optional fields.  Payloads missing those coordinates are dropped.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

// Domain events.

/// Every event the router knows how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Mention(MentionEvent),
    Message(MessageEvent),
    Reaction(ReactionEvent),
    Command(CommandEvent),
    AssistantThreadStarted(AssistantThreadEvent),
    AssistantThreadMessage(AssistantThreadEvent),
}

/// The bot was @-mentioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionEvent {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
}

/// A message in a direct conversation or channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel: String,
    pub channel_type: Option<String>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub ts: String,
    pub thread_ts: Option<String>,
    pub origin: MessageOrigin,
}

impl MessageEvent {
    /// Whether the message was sent in a one-to-one conversation with the bot.
    pub fn is_direct(&self) -> bool {
        self.channel_type.as_deref() == Some("im")
    }
}

/// Who produced a message event, as far as the platform flags tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOrigin {
    User,
    Bot,
    Edited,
    Other(String),
}

/// A reaction was added to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub reaction: String,
    pub user: Option<String>,
    pub channel: String,
    pub ts: String,
}

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    pub command: String,
    pub text: String,
    pub channel: String,
    pub user: String,
    pub response_url: String,
}

/// An event on the assistant surface, scoped to one assistant thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantThreadEvent {
    pub channel: String,
    pub thread_ts: String,
    pub text: Option<String>,
}

// Wire shapes.

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    AppMention(WireMessage),
    Message(WireMessage),
    ReactionAdded(WireReaction),
    AssistantThreadStarted(WireAssistantEvent),
    AssistantThreadMessage(WireAssistantEvent),
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct WireMessage {
    channel: Option<String>,
    channel_type: Option<String>,
    user: Option<String>,
    bot_id: Option<String>,
    text: Option<String>,
    ts: Option<String>,
    thread_ts: Option<String>,
    subtype: Option<String>,
}

#[derive(Deserialize)]
struct WireReaction {
    user: Option<String>,
    reaction: Option<String>,
    item: Option<WireReactionItem>,
}

#[derive(Deserialize)]
struct WireReactionItem {
    #[serde(rename = "type")]
    kind: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
}

#[derive(Deserialize)]
struct WireAssistantEvent {
    assistant_thread: Option<WireAssistantThread>,
    channel: Option<String>,
    thread_ts: Option<String>,
    text: Option<String>,
    message: Option<WireText>,
}

#[derive(Deserialize)]
struct WireAssistantThread {
    channel_id: Option<String>,
    thread_ts: Option<String>,
    latest_message: Option<WireText>,
}

#[derive(Deserialize)]
struct WireText {
    text: Option<String>,
}

// Parsing.

/// Parse a push event payload into an `InboundEvent`.
///
/// Returns `None` for event types without a handler and for payloads missing
/// the coordinates their handler needs.
pub fn parse_push_event(payload: &Value) -> Option<InboundEvent> {
    let wire = match WireEvent::deserialize(payload) {
        Ok(wire) => wire,
        Err(err) => {
            debug!("Unable to parse push event: {}", err);
            return None;
        }
    };

    match wire {
        WireEvent::AppMention(m) => Some(InboundEvent::Mention(MentionEvent {
            channel: non_empty(m.channel)?,
            user: m.user.unwrap_or_default(),
            text: m.text.unwrap_or_default(),
            ts: non_empty(m.ts)?,
            thread_ts: non_empty(m.thread_ts),
        })),
        WireEvent::Message(m) => {
            let origin = match m.subtype.as_deref() {
                Some("bot_message") => MessageOrigin::Bot,
                Some("message_changed") => MessageOrigin::Edited,
                _ if m.bot_id.is_some() => MessageOrigin::Bot,
                Some(other) => MessageOrigin::Other(other.to_string()),
                None => MessageOrigin::User,
            };

            Some(InboundEvent::Message(MessageEvent {
                channel: non_empty(m.channel)?,
                channel_type: m.channel_type,
                user: non_empty(m.user),
                text: m.text,
                ts: non_empty(m.ts)?,
                thread_ts: non_empty(m.thread_ts),
                origin,
            }))
        }
        WireEvent::ReactionAdded(r) => {
            let item = r.item?;

            if item.kind.as_deref().is_some_and(|kind| kind != "message") {
                return None;
            }

            Some(InboundEvent::Reaction(ReactionEvent {
                reaction: non_empty(r.reaction)?,
                user: non_empty(r.user),
                channel: non_empty(item.channel)?,
                ts: non_empty(item.ts)?,
            }))
        }
        WireEvent::AssistantThreadStarted(a) => parse_assistant_event(a, false).map(InboundEvent::AssistantThreadStarted),
        WireEvent::AssistantThreadMessage(a) => parse_assistant_event(a, true).map(InboundEvent::AssistantThreadMessage),
        WireEvent::Unsupported => None,
    }
}

/// Resolve the thread coordinates (and optionally the text) of an assistant-surface event.
fn parse_assistant_event(event: WireAssistantEvent, with_text: bool) -> Option<AssistantThreadEvent> {
    let (thread_channel, thread_ts, latest) = match event.assistant_thread {
        Some(thread) => (thread.channel_id, thread.thread_ts, thread.latest_message.and_then(|m| m.text)),
        None => (None, None, None),
    };

    let text = if with_text {
        [event.message.and_then(|m| m.text), event.text, latest].into_iter().flatten().find(|t| !t.is_empty())
    } else {
        None
    };

    Some(AssistantThreadEvent {
        channel: non_empty(thread_channel).or(non_empty(event.channel))?,
        thread_ts: non_empty(thread_ts).or(non_empty(event.thread_ts))?,
        text,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_app_mention() {
        let event = parse_push_event(&json!({
            "type": "app_mention",
            "user": "U54321",
            "text": "<@U12345> Help me",
            "ts": "1700000000.000200",
            "thread_ts": "1700000000.000100",
            "channel": "C01TEST",
            "event_ts": "1700000000.000200",
        }));

        assert_eq!(
            event,
            Some(InboundEvent::Mention(MentionEvent {
                channel: "C01TEST".to_string(),
                user: "U54321".to_string(),
                text: "<@U12345> Help me".to_string(),
                ts: "1700000000.000200".to_string(),
                thread_ts: Some("1700000000.000100".to_string()),
            }))
        );
    }

    #[test]
    fn test_parse_direct_message() {
        let Some(InboundEvent::Message(message)) = parse_push_event(&json!({
            "type": "message",
            "channel": "D01",
            "channel_type": "im",
            "user": "U1",
            "text": "hi",
            "ts": "1.000001",
        })) else {
            panic!("expected a message event");
        };

        assert!(message.is_direct());
        assert_eq!(message.origin, MessageOrigin::User);
        assert_eq!(message.thread_ts, None);
    }

    #[test]
    fn test_message_origin_flags() {
        let origin = |extra: Value| {
            let mut payload = json!({ "type": "message", "channel": "C1", "ts": "1.0", "text": "x" });
            payload.as_object_mut().unwrap().extend(extra.as_object().unwrap().clone());

            match parse_push_event(&payload) {
                Some(InboundEvent::Message(m)) => m.origin,
                other => panic!("unexpected {other:?}"),
            }
        };

        assert_eq!(origin(json!({ "subtype": "bot_message" })), MessageOrigin::Bot);
        assert_eq!(origin(json!({ "bot_id": "B1" })), MessageOrigin::Bot);
        assert_eq!(origin(json!({ "subtype": "message_changed" })), MessageOrigin::Edited);
        assert_eq!(origin(json!({ "subtype": "thread_broadcast" })), MessageOrigin::Other("thread_broadcast".to_string()));
        assert_eq!(origin(json!({})), MessageOrigin::User);
    }

    #[test]
    fn test_parse_reaction() {
        let event = parse_push_event(&json!({
            "type": "reaction_added",
            "user": "U1",
            "reaction": "memo",
            "item": { "type": "message", "channel": "C1", "ts": "1.5" },
            "event_ts": "2.0",
        }));

        assert_eq!(
            event,
            Some(InboundEvent::Reaction(ReactionEvent {
                reaction: "memo".to_string(),
                user: Some("U1".to_string()),
                channel: "C1".to_string(),
                ts: "1.5".to_string(),
            }))
        );
    }

    #[test]
    fn test_reaction_on_file_is_dropped() {
        let event = parse_push_event(&json!({
            "type": "reaction_added",
            "user": "U1",
            "reaction": "memo",
            "item": { "type": "file", "file": "F1" },
        }));

        assert_eq!(event, None);
    }

    #[test]
    fn test_missing_coordinates_are_dropped() {
        assert_eq!(parse_push_event(&json!({ "type": "app_mention", "text": "hi", "ts": "1.0" })), None);
        assert_eq!(parse_push_event(&json!({ "type": "message", "channel": "C1", "text": "hi" })), None);
        assert_eq!(parse_push_event(&json!({ "type": "message", "channel": "", "ts": "1.0" })), None);
    }

    #[test]
    fn test_unsupported_types_are_dropped() {
        assert_eq!(parse_push_event(&json!({ "type": "channel_created", "channel": { "id": "C1" } })), None);
        assert_eq!(parse_push_event(&json!({ "no_type": true })), None);
    }

    #[test]
    fn test_parse_assistant_thread_started() {
        let event = parse_push_event(&json!({
            "type": "assistant_thread_started",
            "assistant_thread": { "user_id": "U1", "channel_id": "D1", "thread_ts": "9.0", "context": {} },
            "event_ts": "9.1",
        }));

        assert_eq!(
            event,
            Some(InboundEvent::AssistantThreadStarted(AssistantThreadEvent {
                channel: "D1".to_string(),
                thread_ts: "9.0".to_string(),
                text: None,
            }))
        );
    }

    #[test]
    fn test_assistant_thread_message_text_precedence() {
        let text_of = |payload: Value| match parse_push_event(&payload) {
            Some(InboundEvent::AssistantThreadMessage(event)) => event.text,
            other => panic!("unexpected {other:?}"),
        };

        let thread = json!({ "channel_id": "D1", "thread_ts": "9.0", "latest_message": { "text": "latest" } });

        assert_eq!(
            text_of(json!({ "type": "assistant_thread_message", "assistant_thread": thread, "message": { "text": "nested" }, "text": "flat" })),
            Some("nested".to_string())
        );
        assert_eq!(text_of(json!({ "type": "assistant_thread_message", "assistant_thread": thread, "text": "flat" })), Some("flat".to_string()));
        assert_eq!(text_of(json!({ "type": "assistant_thread_message", "assistant_thread": thread })), Some("latest".to_string()));
        assert_eq!(text_of(json!({ "type": "assistant_thread_message", "channel": "D2", "thread_ts": "3.0" })), None);
    }
}
