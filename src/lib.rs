//! Library root for `trail-bot`.
//!
//! Trail-bot is an OpenAI-powered assistant for a Slack community designed to:
//! - Answer @-mentions and direct messages, with thread history as context
//! - Summarize a message when it receives the :memo: reaction
//! - Create, update, and show canvases through a slash command
//!
//! The bot integrates with Slack for chat and OpenAI for responses. The
//! architecture is built around traits at the service boundaries so that
//! each platform can be swapped out (or mocked in tests).

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the trail-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the LLM and chat clients
/// - Serves events until SIGINT or SIGTERM
pub async fn start(config: Config) -> Void {
    info!("Starting trail-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    info!("Trail-bot stopped.");

    Ok(())
}
