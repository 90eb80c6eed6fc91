//! System prompts and static replies used by the bot.

/// Default system directive for the assistant persona.
pub const ASSISTANT_SYSTEM_DIRECTIVE: &str = r#####"You are Trail Bites AI Assistant, a helpful and friendly AI assistant for the Trail Bites Slack community.

Your capabilities include:
- Answering questions and providing information
- Creating and editing canvases (Slack's document format)
- Reading and understanding context from messages
- Helping with file management
- Assisting with community engagement

Be concise, helpful, and maintain a friendly tone. When creating documents or canvases, structure the content clearly and professionally."#####;

/// System directive for the summarizer.
pub const SUMMARY_SYSTEM_DIRECTIVE: &str = "You are a helpful assistant that provides concise summaries of text.";

/// Build the user turn for a summary request.
pub fn summary_request(text: &str) -> String {
    format!("Please provide a brief summary of the following text:\n\n{text}")
}

/// Build the drafting prompt for a new canvas.
pub fn canvas_draft_request(title: &str) -> String {
    format!("Create a canvas document with the title \"{title}\". Provide a well-structured document outline and initial content.")
}

/// Build the rewriting prompt for a canvas update.
pub fn canvas_update_request(text: &str) -> String {
    format!("Update the canvas content with: {text}")
}

// Fallbacks.

pub const GENERATE_FALLBACK: &str = "Sorry, I could not generate a response.";
pub const SUMMARY_FALLBACK: &str = "Could not generate summary.";

// Static replies.

pub const MENTION_GREETING: &str = "Hi! How can I help you today?";
pub const MENTION_APOLOGY: &str = "Sorry, I encountered an error processing your request. Please try again.";
pub const MESSAGE_APOLOGY: &str = "Sorry, I encountered an error processing your message. Please try again.";
pub const ASSISTANT_THREAD_GREETING: &str = "Hi! I’m online. Ask me anything and I’ll help.";
pub const ASSISTANT_THREAD_UNREADABLE: &str = "I saw your message, but I couldn't read the text payload. Can you try again?";

/// Placeholder acknowledgement for assistant-surface thread messages.
pub fn assistant_thread_echo(text: &str) -> String {
    format!("Got it — you said: “{text}”. (Next: wire this into the LLM response.)")
}
