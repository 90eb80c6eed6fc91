//! Runtime services and shared state for the trail-bot.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, identity::BotIdentity, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the chat client, LLM client, bot identity, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The bot's own user ID, resolved on first use.
    pub identity: BotIdentity,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Nothing here talks to the network; connections are opened by `start`.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::openai(&config)?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config)?;

        Ok(Self {
            config,
            chat,
            llm,
            identity: BotIdentity::new(),
        })
    }

    /// Serve events until a termination signal arrives.
    pub async fn start(&self) -> Void {
        info!("{} is running!", self.config.bot_name);

        self.chat.start(self.clone()).await
    }
}

/// Wait for SIGINT (Ctrl-C) or, on unix, SIGTERM.
pub async fn shutdown_signal() -> Void {
    #[cfg(unix)]
    {
        let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
