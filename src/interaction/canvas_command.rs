//! The canvas slash command.
//!
//! The command is acknowledged by the listener before any of this runs; every
//! reply produced here is posted ephemerally through the command's response URL.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        prompts,
        types::{CompletionRequest, Res, Void},
    },
    runtime::Runtime,
    service::canvas::CanvasClient,
};

use super::event::CommandEvent;

/// Number of content characters shown by `get`.
pub const PREVIEW_CHARS: usize = 500;

static CONTENT_DELIMITER: OnceLock<Regex> = OnceLock::new();

/// Splits `<title> with content: <content>`, case-insensitively.
fn content_delimiter() -> &'static Regex {
    CONTENT_DELIMITER.get_or_init(|| Regex::new(r"(?i)^(.+?)\s+with content:\s+(.+)$").expect("content delimiter is a valid regex"))
}

// Parsing.

/// The canvas actions that take an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasVerb {
    Create,
    Update,
    Get,
}

impl CanvasVerb {
    /// Usage hint for this action under the slash command `command`.
    pub fn usage(&self, command: &str) -> String {
        match self {
            CanvasVerb::Create => format!("Usage: `{command} create <title>` or `{command} create <title> with content: <content>`"),
            CanvasVerb::Update => format!("Usage: `{command} update <canvas_id> <new_content>`"),
            CanvasVerb::Get => format!("Usage: `{command} get <canvas_id>`"),
        }
    }
}

/// A parsed canvas command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasAction {
    /// Create a canvas; without literal content, the content is drafted by the model.
    Create { title: String, content: Option<String> },
    /// Rewrite the canvas content from `text`.
    Update { canvas_id: String, text: Option<String> },
    /// Show a canvas.
    Get { canvas_id: String },
    /// A known action without its required argument.
    MissingArgument(CanvasVerb),
    /// Anything else.
    Help,
}

/// Parse the text that follows the slash command.
///
/// The first space-separated token selects the action; the remaining tokens,
/// rejoined with single spaces, are its argument.
pub fn parse_canvas_command(text: &str) -> CanvasAction {
    let mut tokens = text.split(' ').filter(|token| !token.is_empty());

    let Some(action) = tokens.next() else {
        return CanvasAction::Help;
    };

    let args = tokens.collect::<Vec<_>>().join(" ");

    match action {
        "create" | "new" => {
            if args.is_empty() {
                return CanvasAction::MissingArgument(CanvasVerb::Create);
            }

            match content_delimiter().captures(&args) {
                Some(captures) => CanvasAction::Create {
                    title: captures[1].to_string(),
                    content: Some(captures[2].to_string()),
                },
                None => CanvasAction::Create { title: args, content: None },
            }
        }
        "update" | "edit" => {
            if args.is_empty() {
                return CanvasAction::MissingArgument(CanvasVerb::Update);
            }

            let (canvas_id, text) = args.split_once(' ').unwrap_or((args.as_str(), ""));

            CanvasAction::Update {
                canvas_id: canvas_id.to_string(),
                text: Some(text.to_string()).filter(|text| !text.is_empty()),
            }
        }
        "get" | "show" => {
            if args.is_empty() {
                return CanvasAction::MissingArgument(CanvasVerb::Get);
            }

            CanvasAction::Get { canvas_id: args }
        }
        _ => CanvasAction::Help,
    }
}

/// Listing of every action under the slash command `command`.
pub fn help_text(command: &str) -> String {
    format!(
        "Available commands:\n\
         • `{command} create <title>` - Create a new canvas\n\
         • `{command} create <title> with content: <content>` - Create canvas with specific content\n\
         • `{command} update <canvas_id> <content>` - Update an existing canvas\n\
         • `{command} get <canvas_id>` - Get canvas information"
    )
}

/// The first `PREVIEW_CHARS` characters of `content`.
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

// Handling.

/// Handles a slash command.
#[instrument(skip_all)]
pub async fn handle_command(event: CommandEvent, runtime: &Runtime) -> Void {
    let command = runtime.config.canvas_command.as_str();

    if event.command != command {
        warn!("Unsupported slash command: {}", event.command);
        let reply = format!("Sorry, `{}` is not supported.", event.command);
        return runtime.chat.respond_ephemeral(&event.response_url, &reply).await;
    }

    info!("Canvas command received in {}", event.channel);

    let reply = match run_canvas_command(&event, command, runtime).await {
        Ok(reply) => reply,
        Err(err) => {
            error!("Error handling canvas command: {}", err);
            format!("❌ Error: {err}")
        }
    };

    runtime.chat.respond_ephemeral(&event.response_url, &reply).await
}

async fn run_canvas_command(event: &CommandEvent, command: &str, runtime: &Runtime) -> Res<String> {
    let canvases = CanvasClient::new(runtime.chat.clone());

    match parse_canvas_command(&event.text) {
        CanvasAction::Create { title, content } => {
            let content = match content {
                Some(content) => content,
                None => runtime.llm.generate(&command_request(event, prompts::canvas_draft_request(&title))).await?,
            };

            let canvas = canvases.create(&event.channel, &title, &content).await?;

            Ok(format!("✅ Canvas created: {}\n{}", canvas.title, canvas.url))
        }
        CanvasAction::Update { text: None, .. } => {
            debug!("Canvas update without content.");
            Ok("Please provide content to update the canvas with.".to_string())
        }
        CanvasAction::Update { canvas_id, text: Some(text) } => {
            let content = runtime.llm.generate(&command_request(event, prompts::canvas_update_request(&text))).await?;

            canvases.update(&canvas_id, &content).await?;

            Ok("✅ Canvas updated successfully!".to_string())
        }
        CanvasAction::Get { canvas_id } => {
            let canvas = canvases.get(&canvas_id).await?;
            let content = canvas.content.unwrap_or_default();

            Ok(format!("📄 Canvas: {}\n{}\n\nContent preview:\n{}...", canvas.title, canvas.url, preview(&content)))
        }
        CanvasAction::MissingArgument(verb) => {
            debug!("Canvas command missing an argument for {:?}.", verb);
            Ok(verb.usage(command))
        }
        CanvasAction::Help => Ok(help_text(command)),
    }
}

fn command_request(event: &CommandEvent, text: String) -> CompletionRequest {
    CompletionRequest {
        channel: event.channel.clone(),
        user: event.user.clone(),
        text,
        ..Default::default()
    }
}

// Tests.
