//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by the trail-bot:
//! - Chat services (e.g., Slack)
//! - LLM services (e.g., OpenAI)
//! - Canvas documents, layered over the chat service
//! - The bot's own identity, resolved once through the chat service
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod canvas;
pub mod chat;
pub mod identity;
pub mod llm;
