//! Event handling for the bot.
//!
//! Inbound events are parsed once (`event`), routed (`router`), and handled by
//! one module per event type.  Handlers share the context lookups in `context`
//! and the mention handling in `text`.

pub mod app_mention;
pub mod assistant_thread;
pub mod canvas_command;
pub mod context;
pub mod event;
pub mod message;
pub mod reaction;
pub mod router;
pub mod text;
