//! Core components, types, and utilities for the trail-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - System prompts and static replies.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
