//! The bot's own user identity.
//!
//! Looked up once through the chat client and cached for the lifetime of the
//! process.  There is no invalidation: if the credentials change, restart.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::base::types::Res;

use super::chat::ChatClient;

/// Lazily populated, single-assignment cell holding the bot user ID.
///
/// Cloning shares the same cell, so every handler sees the value resolved by
/// whichever caller got there first.
#[derive(Clone, Default)]
pub struct BotIdentity {
    cell: Arc<OnceCell<String>>,
}

impl BotIdentity {
    /// An identity that has not been resolved yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// An identity that is already known (e.g., in tests).
    pub fn known(user_id: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(user_id.into()))),
        }
    }

    /// The cached identity, if it has been resolved.
    pub fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// Resolve the identity, asking the chat platform on first use.
    ///
    /// A failed lookup leaves the cell empty, so the next caller tries again.
    pub async fn resolve(&self, chat: &ChatClient) -> Res<String> {
        let user_id = self
            .cell
            .get_or_try_init(|| async {
                let user_id = chat.bot_user_id().await?;

                if user_id.is_empty() {
                    return Err(anyhow::anyhow!("Chat platform returned an empty bot user ID."));
                }

                info!("Bot user ID: {}", user_id);

                Ok(user_id)
            })
            .await?;

        Ok(user_id.clone())
    }
}
